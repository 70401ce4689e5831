use breachwatch::config::{generate::generate_starter_config, load_config};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn generated_config_is_valid_and_carries_the_documented_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, generate_starter_config()).unwrap();

    let config = load_config(&config_path).expect("generated config should load");

    assert_eq!(config.source.file, std::path::Path::new("/var/log/auth.log.gz"));
    assert_eq!(config.source.syslog_year, 2011);
    assert_eq!(config.detection.attempts, 5);
    assert_eq!(config.detection.window_seconds, 60.0);
    assert_eq!(config.pipeline.parser_parallelism, 8);
    assert_eq!(config.pipeline.buffer_limit, 1024);
    assert_eq!(
        config.pipeline.on_parse_error,
        breachwatch::config::types::ParseErrorStrategy::Abort
    );
    assert_eq!(config.output.breakins_path.to_str().unwrap(), "Breakins.txt");
    assert_eq!(config.output.exec_time_path.to_str().unwrap(), "ExecTime.txt");
    assert!(config.output.successes_path.is_none());
    assert!(config.output.real_time_path.is_none());
}

#[test]
fn minimal_config_fills_in_every_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.source.syslog_year, 2011);
    assert_eq!(config.pipeline.parser_parallelism, 8);
    assert_eq!(config.pipeline.buffer_limit, 1024);
}

#[test]
fn env_var_expansion_applies_to_source_file() {
    std::env::set_var("BREACHWATCH_E2E_LOG_DIR", "/var/log/e2e-test");
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: $env{BREACHWATCH_E2E_LOG_DIR}/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(
        config.source.file.to_str().unwrap(),
        "/var/log/e2e-test/auth.log.gz"
    );
    std::env::remove_var("BREACHWATCH_E2E_LOG_DIR");
}

#[test]
fn unset_env_var_is_left_as_a_literal_token() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: $env{BREACHWATCH_E2E_DEFINITELY_UNSET}/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(
        config.source.file.to_str().unwrap(),
        "$env{BREACHWATCH_E2E_DEFINITELY_UNSET}/auth.log.gz"
    );
}

#[test]
fn tilde_in_diagnostic_paths_is_expanded() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
output:
  successes_path: ~/breachwatch-e2e/Successes.txt
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(
        config.output.successes_path.unwrap(),
        home.join("breachwatch-e2e/Successes.txt")
    );
}

#[test]
fn zero_attempts_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 0
  window_seconds: 60.0
"#,
    );

    assert!(load_config(&path).is_err());
}

#[test]
fn nonpositive_window_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: -1.0
"#,
    );

    assert!(load_config(&path).is_err());
}

#[test]
fn zero_parallelism_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
source:
  file: /tmp/auth.log.gz
detection:
  attempts: 5
  window_seconds: 60.0
pipeline:
  parser_parallelism: 0
"#,
    );

    assert!(load_config(&path).is_err());
}

#[test]
fn malformed_yaml_is_reported_as_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "source: [this is not a mapping\n");
    assert!(load_config(&path).is_err());
}

#[test]
fn missing_file_is_reported_as_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.yml");
    assert!(load_config(&path).is_err());
}
