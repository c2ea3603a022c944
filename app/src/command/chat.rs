//! Chat command: one message, or an interactive loop on a single session.

use std::io::Write;

use solemate_conversation::{ChatReply, ConversationOrchestrator};
use solemate_core::SessionId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{build_orchestrator, init_common_components};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session to resume; a fresh one is started when absent
    pub session_id: Option<String>,
    /// Single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Keep history in memory only
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut common = init_common_components().await?;
        if input.ephemeral {
            info!("Ephemeral mode: history will not be saved");
            common = common.with_ephemeral_history();
        }
        if !common.config.provider.has_api_key() {
            anyhow::bail!(
                "No Gemini API key configured. Set provider.api_key in ~/solemate/config.json \
                 or export GEMINI_API_KEY."
            );
        }

        let orchestrator = build_orchestrator(&common).await;
        let session_id = input
            .session_id
            .map_or_else(|| orchestrator.start_session(), SessionId::new);
        info!("Starting conversation session: {session_id}");

        if let Some(msg) = input.message {
            let reply = orchestrator.handle_message(&session_id, &msg).await?;
            print_reply(&reply);
            Ok(())
        } else {
            run_interactive(&orchestrator, &session_id, input.ephemeral).await
        }
    }
}

fn print_reply(reply: &ChatReply) {
    println!("{}", reply.reply_text);
    if let Some(usage) = reply.usage {
        debug!(
            "Tokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
}

async fn run_interactive(
    orchestrator: &ConversationOrchestrator,
    session_id: &SessionId,
    ephemeral: bool,
) -> anyhow::Result<()> {
    println!("=== Conversation Session: {session_id} ===");
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turns = 0_usize;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match orchestrator.handle_message(session_id, input).await {
            Ok(reply) => {
                println!();
                print_reply(&reply);
                println!();
                turns += 1;
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    println!("\nSession ended. Total turns: {turns}");
    if !ephemeral {
        println!("Resume with: solemate chat -s {session_id}");
    }
    Ok(())
}
