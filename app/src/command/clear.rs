use solemate_core::SessionId;

use super::{build_orchestrator, init_common_components};

#[derive(Debug, Clone)]
pub struct ClearInput {
    pub session_id: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ClearStrategy;

impl super::CommandStrategy for ClearStrategy {
    type Input = ClearInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components().await?;
        let orchestrator = build_orchestrator(&common).await;
        let session_id = SessionId::new(input.session_id);

        if orchestrator.clear_history(&session_id).await? {
            println!("Cleared session {session_id}");
        } else {
            println!("Session {session_id} not found");
        }
        Ok(())
    }
}
