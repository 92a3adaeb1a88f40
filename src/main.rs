use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snapit::config::RunConfiguration;
use snapit::platform::github::GitHubPlatform;
use snapit::runner::ProcessRunner;
use snapit::webhook::CommandEvent;
use snapit::workflow::{SnapshotWorkflow, WorkflowOutcome};
use snapit::workspace::LocalRepository;

#[derive(Parser)]
#[command(
    name = "snapit",
    about = "Publish snapshot releases from pull request comments"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the event payload (defaults to GITHUB_EVENT_PATH)
    #[arg(long)]
    event_path: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "Snapshot run failed");
        snapit::actions::set_failed(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfiguration::load(cli.config.as_deref())?;
    tracing::debug!(config = ?config, "Loaded configuration");

    let event_path = cli
        .event_path
        .or_else(|| config.event_path.clone())
        .context("GITHUB_EVENT_PATH is not set")?;
    let event = CommandEvent::load(&event_path).await?;

    let platform = GitHubPlatform::new(config.github_token())?;
    let runner = ProcessRunner::new(&config.working_directory);
    let git = LocalRepository::new(&config.working_directory, config.github_token());

    let outcome = SnapshotWorkflow::new(&config, &platform, &runner, &git)
        .run(&event)
        .await?;

    match outcome {
        WorkflowOutcome::Ignored => {}
        WorkflowOutcome::Published { snapshots } => {
            tracing::info!(count = snapshots.len(), "Snapshots published");
        }
        WorkflowOutcome::PushedToBranch { branch, snapshots } => {
            tracing::info!(branch = %branch, count = snapshots.len(), "Snapshots pushed");
        }
    }

    Ok(())
}
