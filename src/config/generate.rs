/// Produces the fully-commented default config shipped by `breachwatch config init`.
pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# BREACHWATCH CONFIGURATION
# =============================================================================
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/breachwatch/config.yml
#   3. /etc/breachwatch/config.yml

# =============================================================================
# SOURCE
# =============================================================================
source:
  # Path to the gzip-compressed syslog file to ingest. Supports $env{VAR} and ~.
  file: /var/log/auth.log.gz
  # Syslog lines carry no year; this value is stamped onto every parsed timestamp.
  syslog_year: 2011

# =============================================================================
# DETECTION
# =============================================================================
detection:
  # N: number of authentication failures that must land within `window_seconds`
  # at a single remote host before that user/host pair becomes a suspect.
  attempts: 5
  # T: the rolling window width, in seconds.
  window_seconds: 60.0

# =============================================================================
# PIPELINE
# =============================================================================
pipeline:
  # P: width of the parser fan-out.
  parser_parallelism: 8
  # Per-channel bound for every inter-operator queue.
  buffer_limit: 1024
  # What to do with a tuple that fails to parse: 'drop' it and keep a counter,
  # or 'abort' the whole run (matches the reference implementation's infallible
  # positional indexing).
  on_parse_error: abort

# =============================================================================
# OUTPUT
# =============================================================================
output:
  breakins_path: Breakins.txt
  exec_time_path: ExecTime.txt
  # Optional diagnostics. Omit to skip writing them; `breachwatch clean` removes them.
  # successes_path: Successes.txt
  # real_time_path: RealTime.txt
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse::parse_config_str;

    #[test]
    fn generated_config_parses() {
        let yaml = generate_starter_config();
        let config = parse_config_str(&yaml).expect("generated config must parse");
        assert_eq!(config.detection.attempts, 5);
        assert_eq!(config.detection.window_seconds, 60.0);
        assert_eq!(config.pipeline.parser_parallelism, 8);
    }
}
