#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    ChatInput, ChatStrategy, ClearInput, ClearStrategy, CommandStrategy, HistoryInput,
    HistoryStrategy, InfoStrategy, InitStrategy, ProductsStrategy, SeedStrategy,
    SessionsStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "solemate")]
#[command(about = "Footwear catalog chat assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Chat with the assistant
    Chat {
        /// Session to resume (a new one is started if omitted)
        #[arg(short = 's', long)]
        session: Option<String>,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Keep history in memory only, nothing is written to the database
        #[arg(long)]
        ephemeral: bool,
    },
    /// Show a session's history
    History {
        #[arg(short = 's', long)]
        session: String,

        /// Only the latest N turns
        #[arg(short = 'l', long)]
        limit: Option<usize>,
    },
    /// Delete a session and its history
    Clear {
        #[arg(short = 's', long)]
        session: String,
    },
    /// List sessions, most recent first
    Sessions,
    /// List the product catalog
    Products,
    /// Load the demo catalog into an empty database
    Seed,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Chat {
            session,
            message,
            ephemeral,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session,
                    message,
                    ephemeral,
                })
                .await
        }
        Commands::History { session, limit } => {
            HistoryStrategy
                .execute(HistoryInput {
                    session_id: session,
                    limit,
                })
                .await
        }
        Commands::Clear { session } => {
            ClearStrategy
                .execute(ClearInput {
                    session_id: session,
                })
                .await
        }
        Commands::Sessions => SessionsStrategy.execute(()).await,
        Commands::Products => ProductsStrategy.execute(()).await,
        Commands::Seed => SeedStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
