use crate::config::parse::{load_config, ConfigError};
use crate::pipeline::{self, RunError as PipelineError, Summary};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Entry point for the default `run` subcommand (and the no-subcommand
/// case, mirrored in `main`'s `Commands::Run | None` dispatch).
pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            eprintln!("  ~/.config/breachwatch/config.yml");
            eprintln!("  /etc/breachwatch/config.yml");
            eprintln!(
                "\nUse --config <path> to specify a config file, or run 'breachwatch config init' to generate one."
            );
            std::process::exit(1);
        }
    };

    run_pipeline(&config_path).await.map_err(|e| e.into())
}

async fn run_pipeline(config_path: &PathBuf) -> Result<Summary, RunError> {
    info!(config_path = %config_path.display(), "loading configuration");
    let config = load_config(config_path)?;

    info!(
        file = %config.source.file.display(),
        attempts = config.detection.attempts,
        window_seconds = config.detection.window_seconds,
        parallelism = config.pipeline.parser_parallelism,
        "starting pipeline run"
    );

    let summary = pipeline::run(&config).await?;
    info!(
        breakins = summary.breakins_written,
        elapsed_seconds = summary.report.elapsed_seconds,
        total_lines = summary.report.total_lines,
        throughput = summary.report.throughput,
        "pipeline run finished"
    );
    Ok(summary)
}
