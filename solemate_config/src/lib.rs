//! `~/solemate/config.json` loading.

mod schema;

pub use schema::{
    API_KEY_PLACEHOLDER, Config, ConversationSettings, DatabaseConfig, ProviderConfig,
    RetrySettings,
};
