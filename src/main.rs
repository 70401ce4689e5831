use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "breachwatch")]
#[command(about = "SSH break-in detector: correlates auth-failure bursts with successful logins", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    Clean,
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breachwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Resolve config path
    let config_path = breachwatch::config::resolve_config_path(cli.config.as_deref());

    // Dispatch to appropriate handler
    match cli.command {
        Some(Commands::Run) | None => {
            // Default behavior is to run. A Ctrl-C here is a clean-abort path
            // for interactive runs, not a graceful drain: the pipeline task is
            // simply dropped mid-stream, which is the same "quiescent, no
            // break-ins finalised" outcome as a missing end-of-stream marker.
            tokio::select! {
                result = breachwatch::cli::run::run(config_path) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("received Ctrl-C, aborting run without graceful drain");
                    std::process::exit(130);
                }
            }
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                breachwatch::cli::config::init(stdout)?;
            }
        },
        Some(Commands::Clean) => {
            breachwatch::cli::clean::run(config_path).await?;
        }
    }

    Ok(())
}
