#![warn(
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

//! Catalog-grounded chat sessions.
//!
//! [`ConversationOrchestrator`] is the entry point: it records each user
//! message, assembles a bounded context from the session history and the
//! product catalog, asks the completion provider for a reply, checks the
//! reply only cites products it was shown, and records the answer.

mod context;
mod grounding;
mod orchestrator;
mod prompt;
mod validation;

pub use context::{ContextAssembler, ContextConfig, ContextWindow, HistoryStats};
pub use grounding::{KeywordExtractor, TermExtractor};
pub use orchestrator::{
    ChatReply, ConversationConfig, ConversationError, ConversationOrchestrator,
    DEFAULT_FALLBACK_REPLY, FallbackReason, HistoryEntry, ReplyOutcome, TurnStage,
};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, Instructions, fact_line, render_prompt};
pub use solemate_providers::RetryPolicy;
pub use validation::{ValidationRejection, extract_references, validate_reply};
