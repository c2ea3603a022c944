use sea_orm::{EntityTrait, PaginatorTrait};
use solemate_config::{API_KEY_PLACEHOLDER, Config};
use solemate_entities::{chat_sessions, products};
use tracing::info;

use super::truncate;

/// Prints the effective configuration and database status.
///
/// Works without a config file, falling back to defaults. API keys and
/// database passwords are masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;

        println!("=== solemate Configuration ===\n");

        println!("Provider:");
        println!("  Model: {}", config.provider.model);
        println!("  Base URL: {}", config.provider.base_url);
        println!("  API Key: {}", mask_api_key(&config.provider.api_key));
        println!("  Request Timeout: {}s", config.provider.request_timeout_secs);
        println!();

        println!("Database:");
        let db_url = &config.database.url;
        println!("  URL: {}", mask_database_url(db_url));

        info!("Testing database connection");
        match solemate_entities::connect(db_url).await {
            Ok(db) => {
                println!("  Status: Connected");
                let product_count = products::Entity::find().count(&db).await.unwrap_or(0);
                let session_count = chat_sessions::Entity::find().count(&db).await.unwrap_or(0);
                println!("  Products: {product_count}");
                println!("  Sessions: {session_count}");
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        let conversation = &config.conversation;
        println!("Conversation:");
        println!("  History Limit: {}", conversation.history_limit);
        println!("  Max Context Chars: {}", conversation.max_context_chars);
        println!("  Max Catalog Facts: {}", conversation.max_catalog_facts);
        println!("  Fallback Reply: {}", truncate(&conversation.fallback_reply, 60));
        if let Some(prompt) = &conversation.system_prompt {
            println!("  System Prompt: {}", truncate(prompt, 60));
        }
        println!();

        println!("Retry:");
        println!("  Max Retries: {}", config.retry.max_retries);
        println!("  Base Delay: {}ms", config.retry.base_delay_ms);
        println!("  Max Delay: {}ms", config.retry.max_delay_ms);
        println!("  Attempt Timeout: {}s", config.retry.attempt_timeout_secs);

        Ok(())
    }
}

fn mask_api_key(key: &str) -> String {
    if key.trim().is_empty() || key == API_KEY_PLACEHOLDER {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}
