use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use solemate_core::{HistoryStore, PersistenceError, Role, Session, SessionId, Turn};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
struct SessionLog {
    session: Session,
    turns: Vec<Turn>,
}

/// History kept in process memory. Lost on restart.
///
/// Each append happens entirely under the write lock, so readers never see a
/// half-recorded turn and sequence numbers cannot collide.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<SessionId, SessionLog>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(
        &self,
        session_id: &SessionId,
        role: Role,
        text: &str,
    ) -> Result<Turn, PersistenceError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let log = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionLog {
                session: Session {
                    id: session_id.clone(),
                    created_at: now,
                    last_activity_at: now,
                },
                turns: Vec::new(),
            });

        let turn = Turn {
            session_id: session_id.clone(),
            seq: log.turns.len() as u64 + 1,
            role,
            text: text.to_string(),
            created_at: now,
        };
        log.turns.push(turn.clone());
        log.session.touch(now);

        debug!("Appended turn {} to session {}", turn.seq, session_id);
        Ok(turn)
    }

    async fn list(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, PersistenceError> {
        let sessions = self.sessions.read().await;
        let Some(log) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let start = limit.map_or(0, |n| log.turns.len().saturating_sub(n));
        Ok(log.turns[start..].to_vec())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool, PersistenceError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn session(&self, session_id: &SessionId) -> Result<Option<Session>, PersistenceError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|log| log.session.clone()))
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, PersistenceError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .map(|log| log.session.clone())
            .collect();
        sessions.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sequence_numbers_start_at_one() {
        let store = InMemoryHistoryStore::new();
        let id = SessionId::new("s1");

        let first = store.append(&id, Role::User, "hola").await.unwrap();
        let second = store.append(&id, Role::Assistant, "hi").await.unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(second.role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_list_with_limit_keeps_most_recent_oldest_first() {
        let store = InMemoryHistoryStore::new();
        let id = SessionId::new("s1");
        for i in 0..5 {
            store.append(&id, Role::User, &format!("msg {i}")).await.unwrap();
        }

        let recent = store.list(&id, Some(2)).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["msg 3", "msg 4"]);

        assert_eq!(store.list(&id, Some(100)).await.unwrap().len(), 5);
        assert!(store.list(&id, Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty_not_error() {
        let store = InMemoryHistoryStore::new();
        let id = SessionId::new("nobody");
        assert!(store.list(&id, None).await.unwrap().is_empty());
        assert!(store.session(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryHistoryStore::new();
        let id = SessionId::new("s1");
        store.append(&id, Role::User, "hello").await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(store.list(&id, None).await.unwrap().is_empty());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_sequence_restarts_after_delete() {
        let store = InMemoryHistoryStore::new();
        let id = SessionId::new("s1");
        store.append(&id, Role::User, "one").await.unwrap();
        store.append(&id, Role::User, "two").await.unwrap();
        store.delete(&id).await.unwrap();

        let turn = store.append(&id, Role::User, "again").await.unwrap();
        assert_eq!(turn.seq, 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_stay_contiguous() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let id = SessionId::new("busy");

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                let id = id.clone();
                tokio::spawn(async move { store.append(&id, Role::User, &format!("m{i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let seqs: Vec<u64> = store
            .list(&id, None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.seq)
            .collect();
        assert_eq!(seqs, (1..=50).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_list_sessions_most_recent_first() {
        let store = InMemoryHistoryStore::new();
        store.append(&SessionId::new("old"), Role::User, "a").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append(&SessionId::new("new"), Role::User, "b").await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id.as_str(), "new");
    }
}
