use serde::{Deserialize, Serialize};
use solemate_core::DEFAULT_FALLBACK_REPLY;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const API_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

const CONFIG_DIR: &str = "solemate";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub conversation: ConversationSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default = "ProviderConfig::default_api_key")]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_model")]
    pub model: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ProviderConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: Self::default_api_key(),
            model: Self::default_model(),
            base_url: Self::default_base_url(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    fn default_api_key() -> String {
        API_KEY_PLACEHOLDER.to_string()
    }

    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }

    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    const fn default_request_timeout_secs() -> u64 {
        60
    }

    /// Whether a real key was configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        dirs::home_dir().map_or_else(
            || "sqlite://solemate.db?mode=rwc".to_string(),
            |home| {
                format!(
                    "sqlite://{}?mode=rwc",
                    home.join(CONFIG_DIR).join("solemate.db").display()
                )
            },
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConversationSettings {
    /// Prior turns kept in the context window
    #[serde(default = "ConversationSettings::default_history_limit")]
    pub history_limit: usize,
    /// Character budget for those turns
    #[serde(default = "ConversationSettings::default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "ConversationSettings::default_max_catalog_facts")]
    pub max_catalog_facts: usize,
    #[serde(default = "ConversationSettings::default_fallback_reply")]
    pub fallback_reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            history_limit: Self::default_history_limit(),
            max_context_chars: Self::default_max_context_chars(),
            max_catalog_facts: Self::default_max_catalog_facts(),
            fallback_reply: Self::default_fallback_reply(),
            system_prompt: None,
        }
    }
}

impl ConversationSettings {
    const fn default_history_limit() -> usize {
        6
    }

    const fn default_max_context_chars() -> usize {
        8000
    }

    const fn default_max_catalog_facts() -> usize {
        5
    }

    fn default_fallback_reply() -> String {
        DEFAULT_FALLBACK_REPLY.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    #[serde(default = "RetrySettings::default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "RetrySettings::default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "RetrySettings::default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "RetrySettings::default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: Self::default_max_retries(),
            base_delay_ms: Self::default_base_delay_ms(),
            max_delay_ms: Self::default_max_delay_ms(),
            attempt_timeout_secs: Self::default_attempt_timeout_secs(),
        }
    }
}

impl RetrySettings {
    const fn default_max_retries() -> u32 {
        2
    }

    const fn default_base_delay_ms() -> u64 {
        500
    }

    const fn default_max_delay_ms() -> u64 {
        5000
    }

    const fn default_attempt_timeout_secs() -> u64 {
        30
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load `~/solemate/config.json` and apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'solemate init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Like [`Config::load`] but falls back to defaults when no file exists.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            debug!("No config at {}, using defaults", config_path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// `GEMINI_API_KEY` and `SOLEMATE_DATABASE_URL` win over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
            debug!("Using GEMINI_API_KEY from environment");
            self.provider.api_key = key;
        }
        if let Some(url) = lookup("SOLEMATE_DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            debug!("Using SOLEMATE_DATABASE_URL from environment");
            self.database.url = url;
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
