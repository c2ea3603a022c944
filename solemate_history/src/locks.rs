use std::collections::HashMap;
use std::sync::{Arc, Weak};

use solemate_core::SessionId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Dead entries are swept on acquire once the map grows past this.
const PRUNE_THRESHOLD: usize = 128;

/// One async mutex per session.
///
/// Appends to the same session wait on each other; different sessions never
/// contend beyond the brief map lookup. The map only holds weak references,
/// so a session's mutex is freed once no guard or waiter keeps it alive.
#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<SessionId, Weak<Mutex<()>>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    pub async fn acquire(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            if map.len() > PRUNE_THRESHOLD {
                map.retain(|_, weak| weak.strong_count() > 0);
            }

            if let Some(existing) = map.get(session_id).and_then(Weak::upgrade) {
                existing
            } else {
                let lock = Arc::new(Mutex::new(()));
                map.insert(session_id.clone(), Arc::downgrade(&lock));
                lock
            }
        };
        lock.lock_owned().await
    }

    /// Number of sessions with a live mutex. Sweeps dead entries.
    pub async fn len(&self) -> usize {
        let mut map = self.inner.lock().await;
        map.retain(|_, weak| weak.strong_count() > 0);
        map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
