use solemate_core::SessionId;

use super::{build_orchestrator, init_common_components, truncate};

#[derive(Debug, Clone)]
pub struct HistoryInput {
    pub session_id: String,
    pub limit: Option<usize>,
}

/// Prints a session's turns, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct HistoryStrategy;

impl super::CommandStrategy for HistoryStrategy {
    type Input = HistoryInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components().await?;
        let orchestrator = build_orchestrator(&common).await;
        let session_id = SessionId::new(input.session_id);

        let entries = orchestrator
            .get_recent_history(&session_id, input.limit)
            .await?;
        if entries.is_empty() {
            println!("No history for session {session_id}");
            return Ok(());
        }

        for entry in &entries {
            println!(
                "[{}] {:>9}: {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.role.as_str(),
                truncate(&entry.text, 200)
            );
        }

        let stats = orchestrator.history_stats(&session_id).await?;
        println!(
            "\n{} turns ({} user, {} assistant), {} characters",
            stats.total_turns, stats.user_turns, stats.assistant_turns, stats.total_characters
        );
        Ok(())
    }
}
