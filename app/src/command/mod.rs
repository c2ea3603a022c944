//! Static strategy pattern for CLI commands.
//!
//! Each command is its own zero-sized strategy type with a typed input;
//! `main` dispatches to them without trait objects.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use solemate_catalog::SqlCatalogStore;
use solemate_config::Config;
use solemate_conversation::{
    ContextConfig, ConversationConfig, ConversationOrchestrator, Instructions, KeywordExtractor,
    RetryPolicy,
};
use solemate_core::{CatalogStore, HistoryStore};
use solemate_history::{InMemoryHistoryStore, SqlHistoryStore};
use solemate_providers::GeminiProvider;
use tracing::{info, warn};

mod chat;
mod clear;
mod history;
mod info;
mod init;
mod products;
mod seed;
mod sessions;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use clear::{ClearInput, ClearStrategy};
pub use history::{HistoryInput, HistoryStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use products::ProductsStrategy;
pub use seed::SeedStrategy;
pub use sessions::SessionsStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Config plus the stores every data-touching command needs.
pub struct CommonComponents {
    pub config: Config,
    pub db: DatabaseConnection,
    pub history: Arc<dyn HistoryStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl CommonComponents {
    /// Keep history in process memory only; the catalog still comes from the
    /// database.
    #[must_use]
    pub fn with_ephemeral_history(mut self) -> Self {
        self.history = Arc::new(InMemoryHistoryStore::new());
        self
    }
}

/// Load config and open one connection shared by both stores.
pub async fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;
    info!("Loaded config from ~/solemate/config.json");
    Config::ensure_config_dir()?;

    let db = solemate_entities::connect(&config.database.url).await?;
    let history = SqlHistoryStore::new(db.clone()).await?;
    let catalog = SqlCatalogStore::new(db.clone()).await?;

    Ok(CommonComponents {
        config,
        db,
        history: Arc::new(history),
        catalog: Arc::new(catalog),
    })
}

pub fn build_conversation_config(config: &Config) -> ConversationConfig {
    let settings = &config.conversation;
    let retry = &config.retry;

    let context = ContextConfig::default()
        .with_max_turns(settings.history_limit)
        .with_max_chars(settings.max_context_chars)
        .with_max_facts(settings.max_catalog_facts);
    let policy = RetryPolicy::default()
        .with_max_retries(retry.max_retries)
        .with_base_delay(Duration::from_millis(retry.base_delay_ms))
        .with_max_delay(Duration::from_millis(retry.max_delay_ms))
        .with_attempt_timeout(Duration::from_secs(retry.attempt_timeout_secs));

    let mut conversation = ConversationConfig::default()
        .with_context(context)
        .with_retry(policy)
        .with_fallback_reply(settings.fallback_reply.clone());
    if let Some(prompt) = &settings.system_prompt {
        conversation = conversation.with_instructions(Instructions::new(prompt.clone()));
    }
    conversation
}

/// Wire the Gemini provider and a catalog-aware extractor into an
/// orchestrator over the common stores.
pub async fn build_orchestrator(common: &CommonComponents) -> ConversationOrchestrator {
    let provider_config = &common.config.provider;
    let provider = GeminiProvider::new(provider_config.api_key.clone())
        .with_base_url(provider_config.base_url.clone())
        .with_model(provider_config.model.clone())
        .with_timeout(Duration::from_secs(provider_config.request_timeout_secs));
    info!("Using Gemini model {}", provider.model());

    let mut extractor = KeywordExtractor::default();
    match common.catalog.list_all().await {
        Ok(products) if !products.is_empty() => {
            extractor = extractor.with_extra_brands(products.iter().map(|p| p.brand.as_str()));
        }
        Ok(_) => warn!("Catalog is empty, run 'solemate seed' to load demo products"),
        Err(e) => warn!("Could not read catalog brands: {e}"),
    }

    ConversationOrchestrator::new(
        Arc::clone(&common.history),
        Arc::clone(&common.catalog),
        Arc::new(provider),
        build_conversation_config(&common.config),
    )
    .with_extractor(Arc::new(extractor))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
