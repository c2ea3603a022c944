use super::{build_orchestrator, init_common_components};

/// Lists stored sessions, most recently active first.
#[derive(Debug, Clone, Copy)]
pub struct SessionsStrategy;

impl super::CommandStrategy for SessionsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components().await?;
        let orchestrator = build_orchestrator(&common).await;

        let sessions = orchestrator.list_sessions().await?;
        if sessions.is_empty() {
            println!("No sessions yet. Start one with 'solemate chat'.");
            return Ok(());
        }

        for session in &sessions {
            println!(
                "{}  created {}  last active {}",
                session.id,
                session.created_at.format("%Y-%m-%d %H:%M"),
                session.last_activity_at.format("%Y-%m-%d %H:%M")
            );
        }
        Ok(())
    }
}
