//! Error taxonomy shared by the stores, the provider and the orchestrator.
//!
//! Only [`PersistenceError`] is ever surfaced to callers of the conversation
//! layer; provider and catalog failures degrade to a best-effort reply.

use thiserror::Error;

/// The history store could not be read or written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),

    #[error("history store returned corrupt data: {0}")]
    Corrupt(String),

    /// Another writer claimed the same sequence number.
    #[error("concurrent append conflict in session {0}")]
    Conflict(String),
}

/// Failure reported by the generative provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Timeouts, rate limits, upstream 5xx. Eligible for retry.
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// Invalid request, rejected credentials, content-policy blocks.
    #[error("permanent provider failure: {0}")]
    Permanent(String),
}

impl ProviderError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
}
