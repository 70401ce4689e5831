use super::types::Config;
use crate::config::{expand_env_vars, expand_tilde};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in '{path}': {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Load and validate a config file, expanding `$env{VAR}` and `~` in path fields.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let expanded = expand_env_vars(&yaml);
    let mut config: Config =
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::YamlParse {
            path: path.display().to_string(),
            source: e,
        })?;

    config.source.file = expand_tilde(&config.source.file);
    if let Some(ref p) = config.output.successes_path {
        config.output.successes_path = Some(expand_tilde(p));
    }
    if let Some(ref p) = config.output.real_time_path {
        config.output.real_time_path = Some(expand_tilde(p));
    }

    validate_config(&config)?;

    Ok(config)
}

/// Parse a config directly from a YAML string (no env/tilde expansion beyond
/// what the caller already applied). Used by the config generator's self-test
/// and by tests that build fixtures in memory.
pub fn parse_config_str(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml).map_err(|e| ConfigError::YamlParse {
        path: "<string>".to_string(),
        source: e,
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.detection.attempts == 0 {
        return Err(ConfigError::Validation(
            "detection.attempts must be at least 1".to_string(),
        ));
    }
    if !(config.detection.window_seconds > 0.0) {
        return Err(ConfigError::Validation(
            "detection.window_seconds must be positive".to_string(),
        ));
    }
    if config.pipeline.parser_parallelism == 0 {
        return Err(ConfigError::Validation(
            "pipeline.parser_parallelism must be at least 1".to_string(),
        ));
    }
    if config.pipeline.buffer_limit == 0 {
        return Err(ConfigError::Validation(
            "pipeline.buffer_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let file = write_config(
            r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.source.syslog_year, 2011);
        assert_eq!(config.pipeline.parser_parallelism, 8);
        assert_eq!(config.pipeline.buffer_limit, 1024);
        assert_eq!(
            config.pipeline.on_parse_error,
            crate::config::types::ParseErrorStrategy::Abort
        );
        assert_eq!(config.output.breakins_path.to_str().unwrap(), "Breakins.txt");
    }

    #[test]
    fn expands_env_vars_in_source_path() {
        std::env::set_var("BREACHWATCH_TEST_LOG_DIR", "/var/log/test");
        let file = write_config(
            r#"
source:
  file: $env{BREACHWATCH_TEST_LOG_DIR}/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.source.file.to_str().unwrap(),
            "/var/log/test/auth.log.gz"
        );
        std::env::remove_var("BREACHWATCH_TEST_LOG_DIR");
    }

    #[test]
    fn rejects_zero_attempts() {
        let file = write_config(
            r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 0
  window_seconds: 60.0
"#,
        );

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_nonpositive_window() {
        let file = write_config(
            r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: 0.0
"#,
        );

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
