use crate::config::generate::generate_starter_config;
use std::io::Write;
use std::path::PathBuf;

/// Writes the fully-commented default config either to stdout
/// or to `~/.config/breachwatch/config.yml`, creating the parent directory if
/// needed.
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let body = generate_starter_config();

    if stdout {
        print!("{body}");
        return Ok(());
    }

    let target = default_user_config_path()
        .ok_or("could not determine home directory for ~/.config/breachwatch/config.yml")?;

    if target.exists() {
        return Err(format!(
            "{} already exists; pass --stdout to print the default config instead",
            target.display()
        )
        .into());
    }

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(&target)?;
    file.write_all(body.as_bytes())?;
    println!("wrote {}", target.display());
    Ok(())
}

fn default_user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/breachwatch/config.yml"))
}
