use solemate_config::Config;

/// Creates the default configuration file at `~/solemate/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config()?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Add your Gemini API key (or export GEMINI_API_KEY)");
        println!("   2. Run 'solemate seed' to load the demo catalog");
        println!("   3. Run 'solemate chat' to start a conversation");
        println!();
        println!("Configuration options:");
        println!("   - conversation.history_limit: prior turns kept in context");
        println!("   - conversation.fallback_reply: reply used when no answer can be generated");
        println!("   - retry.max_retries: extra attempts on transient provider failures");
        Ok(())
    }
}
