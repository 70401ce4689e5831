use crate::config::parse::load_config;
use crate::sink::clean_diagnostics;
use std::path::PathBuf;

/// Removes the optional `Successes.txt`/`RealTime.txt` diagnostic files for
/// the run described by `config_path`.
pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path.ok_or("Error: --config <path> is required for 'breachwatch clean'")?;
    let config = load_config(&config_path)?;

    let mut paths = Vec::new();
    if let Some(p) = &config.output.successes_path {
        paths.push(p.as_path());
    }
    if let Some(p) = &config.output.real_time_path {
        paths.push(p.as_path());
    }

    let removed = clean_diagnostics(&paths).await?;
    if removed.is_empty() {
        println!("nothing to clean");
    } else {
        for path in removed {
            println!("removed {path}");
        }
    }
    Ok(())
}
