#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared domain types and collaborator traits for the footwear catalog
//! assistant.
//!
//! Every other crate in the workspace talks through the three traits defined
//! here: [`HistoryStore`], [`CatalogStore`] and [`CompletionProvider`].

use async_trait::async_trait;

pub mod catalog;
pub mod error;
pub mod prompt;
pub mod session;

pub use catalog::{CatalogFact, CatalogQuery, PriceRange, normalize_term};
pub use error::{CatalogError, PersistenceError, ProviderError};
pub use prompt::{Completion, DEFAULT_FALLBACK_REPLY, PromptMessage, PromptRequest, Usage};
pub use session::{Role, Session, SessionId, Turn};

/// Ordered, per-session turn storage.
///
/// Implementations must serialize appends to the same session so that
/// sequence numbers stay contiguous from 1, and must never expose a partially
/// written turn.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a turn, creating the session on first use.
    async fn append(
        &self,
        session_id: &SessionId,
        role: Role,
        text: &str,
    ) -> Result<Turn, PersistenceError>;

    /// Turns oldest-first. With `limit`, only the most recent `limit` turns
    /// (still oldest-first). Unknown sessions yield an empty list.
    async fn list(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<Vec<Turn>, PersistenceError>;

    /// Remove the session and all of its turns. Returns whether anything
    /// existed.
    async fn delete(&self, session_id: &SessionId) -> Result<bool, PersistenceError>;

    async fn session(&self, session_id: &SessionId) -> Result<Option<Session>, PersistenceError>;

    /// All sessions, most recently active first.
    async fn list_sessions(&self) -> Result<Vec<Session>, PersistenceError>;
}

/// Read-only access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<CatalogFact>, CatalogError>;

    /// Products matching `query`. An empty result is not an error.
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogFact>, CatalogError>;

    async fn list_all(&self) -> Result<Vec<CatalogFact>, CatalogError>;
}

/// Opaque text-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<Completion, ProviderError>;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}
