//! sea-orm entities for the catalog and the conversation history, plus the
//! connection and schema bootstrap shared by the SQL-backed stores.

pub mod chat_sessions;
pub mod chat_turns;
pub mod products;
mod schema;

pub use schema::{connect, ensure_table, ensure_turn_sequence_index};
