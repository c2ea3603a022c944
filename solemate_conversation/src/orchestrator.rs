//! The per-message pipeline.
//!
//! `handle_message` walks one request through
//! [`TurnStage::Received`] to [`TurnStage::Persisted`]. Only history store
//! failures end the request with an error; everything past the user append
//! degrades to the configured fallback reply instead.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use solemate_core::{
    CatalogFact, CatalogStore, CompletionProvider, HistoryStore, PersistenceError, ProviderError,
    Role, Session, SessionId, Turn, Usage,
};
use solemate_providers::RetryPolicy;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::{ContextAssembler, ContextConfig, HistoryStats};
use crate::grounding::{KeywordExtractor, TermExtractor};
use crate::prompt::{Instructions, render_prompt};
use crate::validation::{ValidationRejection, validate_reply};

pub use solemate_core::DEFAULT_FALLBACK_REPLY;

/// Configuration for the conversation pipeline.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub context: ContextConfig,
    pub retry: RetryPolicy,
    pub instructions: Instructions,
    /// Reply stored and returned whenever a generated one cannot be used
    pub fallback_reply: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            context: ContextConfig::default(),
            retry: RetryPolicy::default(),
            instructions: Instructions::default(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub const fn with_context(mut self, context: ContextConfig) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: Instructions) -> Self {
        self.instructions = instructions;
        self
    }

    #[must_use]
    pub fn with_fallback_reply(mut self, reply: String) -> Self {
        self.fallback_reply = reply;
        self
    }
}

/// Where a request is in the pipeline. Used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Received,
    HistoryAppended,
    ContextBuilt,
    ProviderInvoked,
    Validated,
    Persisted,
    Failed,
}

impl TurnStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::HistoryAppended => "history_appended",
            Self::ContextBuilt => "context_built",
            Self::ProviderInvoked => "provider_invoked",
            Self::Validated => "validated",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the fallback reply was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Transient failures outlasted the retry policy.
    RetriesExhausted(String),
    /// The provider refused the request outright.
    ProviderRejected(String),
    Validation(ValidationRejection),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted(e) => write!(f, "retries exhausted: {e}"),
            Self::ProviderRejected(e) => write!(f, "provider rejected request: {e}"),
            Self::Validation(r) => write!(f, "validation rejected reply: {r}"),
        }
    }
}

impl From<ProviderError> for FallbackReason {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transient(e) => Self::RetriesExhausted(e),
            ProviderError::Permanent(e) => Self::ProviderRejected(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Generated,
    Fallback(FallbackReason),
}

impl ReplyOutcome {
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Result of one handled message.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: SessionId,
    pub reply_text: String,
    pub outcome: ReplyOutcome,
    /// Catalog facts the reply was grounded on
    pub facts: Vec<CatalogFact>,
    pub user_turn: Turn,
    pub assistant_turn: Turn,
    pub usage: Option<Usage>,
}

/// A stored turn as exposed to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Turn> for HistoryEntry {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text,
            timestamp: turn.created_at,
        }
    }
}

/// Errors that cross the conversation boundary.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Runs chat requests against the history store, catalog and provider.
///
/// Holds no per-session state of its own; it can be shared across tasks
/// behind an `Arc` and serves any number of sessions concurrently.
pub struct ConversationOrchestrator {
    history: Arc<dyn HistoryStore>,
    catalog: Arc<dyn CatalogStore>,
    provider: Arc<dyn CompletionProvider>,
    extractor: Arc<dyn TermExtractor>,
    assembler: ContextAssembler,
    config: ConversationConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        catalog: Arc<dyn CatalogStore>,
        provider: Arc<dyn CompletionProvider>,
        config: ConversationConfig,
    ) -> Self {
        info!(
            "Creating conversation orchestrator with provider: {}",
            provider.name()
        );
        Self {
            history,
            catalog,
            provider,
            extractor: Arc::new(KeywordExtractor::default()),
            assembler: ContextAssembler::new(config.context),
            config,
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn TermExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// A fresh session id for callers that do not bring their own.
    #[must_use]
    pub fn start_session(&self) -> SessionId {
        let id = SessionId::generate();
        debug!("Started session {id}");
        id
    }

    /// Handle one user message and return the stored reply.
    ///
    /// Dropping the returned future cancels the request. A user turn that
    /// was already appended stays in the history.
    pub async fn handle_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<ChatReply, ConversationError> {
        if session_id.is_blank() {
            return Err(ConversationError::InvalidInput(
                "session id must not be empty".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(ConversationError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }
        log_stage(session_id, TurnStage::Received);

        let user_turn = self
            .history
            .append(session_id, Role::User, text)
            .await
            .inspect_err(|e| log_failure(session_id, e))?;
        log_stage(session_id, TurnStage::HistoryAppended);

        let prior = self.prior_turns(&user_turn).await?;
        let facts = self.ground(session_id, text).await;
        let window = self.assembler.assemble(&prior, facts);
        debug!(
            session_id = %session_id,
            turns = window.turns.len(),
            chars = window.text_len(),
            facts = window.facts.len(),
            "Context assembled"
        );
        log_stage(session_id, TurnStage::ContextBuilt);

        let request = render_prompt(&window, &self.config.instructions, text);
        debug!(
            session_id = %session_id,
            prompt_chars = request.char_len(),
            messages = request.messages.len(),
            "Prompt rendered"
        );
        let result = self
            .config
            .retry
            .run(|| self.provider.complete(&request))
            .await;
        log_stage(session_id, TurnStage::ProviderInvoked);

        let (reply_text, outcome, usage) = match result {
            Ok(completion) => match validate_reply(&completion.text, &window) {
                Ok(()) => (completion.text, ReplyOutcome::Generated, completion.usage),
                Err(rejection) => self.fallback(FallbackReason::Validation(rejection)),
            },
            Err(e) => self.fallback(e.into()),
        };
        if let ReplyOutcome::Fallback(reason) = &outcome {
            warn!(session_id = %session_id, "Using fallback reply: {reason}");
        }
        log_stage(session_id, TurnStage::Validated);

        let assistant_turn = self
            .history
            .append(session_id, Role::Assistant, &reply_text)
            .await
            .inspect_err(|e| log_failure(session_id, e))?;
        info!(
            session_id = %session_id,
            stage = %TurnStage::Persisted,
            fallback = outcome.is_fallback(),
            "Reply stored as turn {}",
            assistant_turn.seq
        );

        Ok(ChatReply {
            session_id: session_id.clone(),
            reply_text,
            outcome,
            facts: window.facts,
            user_turn,
            assistant_turn,
            usage,
        })
    }

    /// The whole session history, oldest first.
    pub async fn get_history(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<HistoryEntry>, ConversationError> {
        self.get_recent_history(session_id, None).await
    }

    /// At most `limit` of the latest entries, oldest first.
    pub async fn get_recent_history(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, ConversationError> {
        let turns = self.history.list(session_id, limit).await?;
        Ok(turns.into_iter().map(HistoryEntry::from).collect())
    }

    /// Delete a session. Returns `false` when it did not exist.
    pub async fn clear_history(&self, session_id: &SessionId) -> Result<bool, ConversationError> {
        let existed = self.history.delete(session_id).await?;
        info!("Clear history for session {session_id}: existed={existed}");
        Ok(existed)
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>, ConversationError> {
        Ok(self.history.list_sessions().await?)
    }

    pub async fn history_stats(
        &self,
        session_id: &SessionId,
    ) -> Result<HistoryStats, ConversationError> {
        let turns = self.history.list(session_id, None).await?;
        Ok(HistoryStats::from_turns(&turns))
    }

    /// Turns stored before `current`, at most one window's worth.
    async fn prior_turns(&self, current: &Turn) -> Result<Vec<Turn>, ConversationError> {
        let limit = self.assembler.config().max_turns.saturating_add(1);
        let turns = self
            .history
            .list(&current.session_id, Some(limit))
            .await
            .inspect_err(|e| log_failure(&current.session_id, e))?;
        Ok(turns.into_iter().filter(|t| t.seq < current.seq).collect())
    }

    /// Catalog facts for `message`. Any catalog error yields no facts.
    async fn ground(&self, session_id: &SessionId, message: &str) -> Vec<CatalogFact> {
        let query = self.extractor.extract(message);
        if query.is_empty() {
            debug!("No catalog terms in message for session {session_id}");
            return Vec::new();
        }

        let mut facts = Vec::new();
        for id in &query.product_ids {
            match self.catalog.get(id).await {
                Ok(Some(fact)) => facts.push(fact),
                Ok(None) => debug!("Product {id} not found"),
                Err(e) => {
                    warn!(session_id = %session_id, "Catalog lookup failed, continuing without products: {e}");
                    return Vec::new();
                }
            }
        }

        if query.has_search_terms() {
            match self.catalog.search(&query).await {
                Ok(found) => facts.extend(found),
                Err(e) => {
                    warn!(session_id = %session_id, "Catalog search failed, continuing without products: {e}");
                    return Vec::new();
                }
            }
        }

        facts
    }

    fn fallback(&self, reason: FallbackReason) -> (String, ReplyOutcome, Option<Usage>) {
        (
            self.config.fallback_reply.clone(),
            ReplyOutcome::Fallback(reason),
            None,
        )
    }
}

fn log_stage(session_id: &SessionId, stage: TurnStage) {
    debug!(session_id = %session_id, stage = %stage, "Turn stage reached");
}

fn log_failure(session_id: &SessionId, error: &PersistenceError) {
    warn!(
        session_id = %session_id,
        stage = %TurnStage::Failed,
        "History store failure: {error}"
    );
}
