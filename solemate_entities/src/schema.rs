use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::chat_turns;

fn is_already_exists_error(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("already exists") || msg.contains("Duplicate key name")
}

/// Open a connection pool for `database_url`.
///
/// In-memory SQLite databases are private to one connection, so their pool is
/// capped at a single connection.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        options.max_connections(1).min_connections(1);
    }

    info!("Connecting to database");
    Database::connect(options).await
}

/// Create the table backing `entity` unless it already exists.
pub async fn ensure_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    match db
        .execute_unprepared(&backend.build(&stmt).to_string())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if is_already_exists_error(&e) => {
            info!("Table {} already exists, skipping creation", entity.table_name());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Unique `(session_id, seq)` index on `chat_turns`, so two writers can never
/// record the same position in a session.
pub async fn ensure_turn_sequence_index(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let stmt = Index::create()
        .name("idx_chat_turns_session_seq")
        .table(chat_turns::Entity)
        .col(chat_turns::Column::SessionId)
        .col(chat_turns::Column::Seq)
        .unique()
        .if_not_exists()
        .to_owned();

    match db
        .execute_unprepared(&backend.build(&stmt).to_string())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if is_already_exists_error(&e) => Ok(()),
        Err(e) => Err(e),
    }
}
