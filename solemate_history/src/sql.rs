use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use solemate_core::{HistoryStore, PersistenceError, Role, Session, SessionId, Turn};
use solemate_entities::{chat_sessions, chat_turns};
use tracing::{debug, info};

use crate::locks::SessionLocks;

fn unavailable(err: DbErr) -> PersistenceError {
    PersistenceError::Unavailable(err.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("unique") || msg.contains("duplicate")
}

fn turn_from_model(model: chat_turns::Model) -> Result<Turn, PersistenceError> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
    let seq = u64::try_from(model.seq)
        .map_err(|_| PersistenceError::Corrupt(format!("negative sequence {}", model.seq)))?;

    Ok(Turn {
        session_id: SessionId::new(model.session_id),
        seq,
        role,
        text: model.message,
        created_at: model.created_at.and_utc(),
    })
}

fn session_from_model(model: chat_sessions::Model) -> Session {
    Session {
        id: SessionId::new(model.id),
        created_at: model.created_at.and_utc(),
        last_activity_at: model.updated_at.and_utc(),
    }
}

/// History persisted through sea-orm.
///
/// Each append runs in one transaction that bumps the session's `last_seq`
/// and inserts the turn, so a failed append leaves nothing behind. Appends to
/// one session are additionally serialized in-process through
/// [`SessionLocks`]; the unique `(session_id, seq)` index catches writers in
/// other processes.
pub struct SqlHistoryStore {
    db: DatabaseConnection,
    locks: SessionLocks,
}

impl SqlHistoryStore {
    /// Wrap an existing connection, creating the history tables if needed.
    pub async fn new(db: DatabaseConnection) -> anyhow::Result<Self> {
        solemate_entities::ensure_table(&db, chat_sessions::Entity).await?;
        solemate_entities::ensure_table(&db, chat_turns::Entity).await?;
        solemate_entities::ensure_turn_sequence_index(&db).await?;

        info!("SqlHistoryStore initialized");
        Ok(Self {
            db,
            locks: SessionLocks::new(),
        })
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = solemate_entities::connect(database_url).await?;
        Self::new(db).await
    }

    async fn append_in_transaction(
        &self,
        session_id: &SessionId,
        role: Role,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<i64, DbErr> {
        let txn = self.db.begin().await?;

        let existing = chat_sessions::Entity::find_by_id(session_id.as_str().to_owned())
            .one(&txn)
            .await?;

        let seq = if let Some(model) = existing {
            let seq = model.last_seq + 1;
            let mut active: chat_sessions::ActiveModel = model.into();
            active.last_seq = Set(seq);
            active.updated_at = Set(now);
            active.update(&txn).await?;
            seq
        } else {
            chat_sessions::ActiveModel {
                id: Set(session_id.as_str().to_owned()),
                last_seq: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            1
        };

        chat_turns::ActiveModel {
            session_id: Set(session_id.as_str().to_owned()),
            seq: Set(seq),
            role: Set(role.as_str().to_owned()),
            message: Set(text.to_owned()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(seq)
    }
}

#[async_trait]
impl HistoryStore for SqlHistoryStore {
    async fn append(
        &self,
        session_id: &SessionId,
        role: Role,
        text: &str,
    ) -> Result<Turn, PersistenceError> {
        let _guard = self.locks.acquire(session_id).await;
        let now = Utc::now();

        let seq = self
            .append_in_transaction(session_id, role, text, now.naive_utc())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::Conflict(session_id.to_string())
                } else {
                    unavailable(e)
                }
            })?;

        debug!("Appended turn {} to session {}", seq, session_id);
        Ok(Turn {
            session_id: session_id.clone(),
            seq: u64::try_from(seq).unwrap_or_default(),
            role,
            text: text.to_string(),
            created_at: now,
        })
    }

    async fn list(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, PersistenceError> {
        let filter = chat_turns::Entity::find()
            .filter(chat_turns::Column::SessionId.eq(session_id.as_str()));

        let models = match limit {
            Some(n) => {
                let mut recent = filter
                    .order_by_desc(chat_turns::Column::Seq)
                    .limit(n as u64)
                    .all(&self.db)
                    .await
                    .map_err(unavailable)?;
                recent.reverse();
                recent
            }
            None => filter
                .order_by_asc(chat_turns::Column::Seq)
                .all(&self.db)
                .await
                .map_err(unavailable)?,
        };

        models.into_iter().map(turn_from_model).collect()
    }

    async fn delete(&self, session_id: &SessionId) -> Result<bool, PersistenceError> {
        let _guard = self.locks.acquire(session_id).await;

        let txn = self.db.begin().await.map_err(unavailable)?;
        let turns = chat_turns::Entity::delete_many()
            .filter(chat_turns::Column::SessionId.eq(session_id.as_str()))
            .exec(&txn)
            .await
            .map_err(unavailable)?;
        let sessions = chat_sessions::Entity::delete_by_id(session_id.as_str().to_owned())
            .exec(&txn)
            .await
            .map_err(unavailable)?;
        txn.commit().await.map_err(unavailable)?;

        let existed = turns.rows_affected > 0 || sessions.rows_affected > 0;
        if existed {
            info!(
                "Cleared session {} ({} turns)",
                session_id, turns.rows_affected
            );
        }
        Ok(existed)
    }

    async fn session(&self, session_id: &SessionId) -> Result<Option<Session>, PersistenceError> {
        let model = chat_sessions::Entity::find_by_id(session_id.as_str().to_owned())
            .one(&self.db)
            .await
            .map_err(unavailable)?;
        Ok(model.map(session_from_model))
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, PersistenceError> {
        let models = chat_sessions::Entity::find()
            .order_by_desc(chat_sessions::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(unavailable)?;
        Ok(models.into_iter().map(session_from_model).collect())
    }
}
