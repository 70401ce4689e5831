use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub detection: DetectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the gzip-compressed syslog file to ingest.
    pub file: PathBuf,
    /// Year to stamp onto parsed timestamps, since syslog lines carry no year.
    #[serde(default = "default_syslog_year")]
    pub syslog_year: i32,
}

fn default_syslog_year() -> i32 {
    2011
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// N: number of failures that must land within `window_seconds` to raise a suspect.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// T: the rolling window width, in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
}

fn default_attempts() -> u32 {
    5
}

fn default_window_seconds() -> f64 {
    60.0
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            window_seconds: default_window_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// P: width of the parser fan-out.
    #[serde(default = "default_parser_parallelism")]
    pub parser_parallelism: usize,
    /// Per-channel bound for every inter-operator queue.
    #[serde(default = "default_buffer_limit")]
    pub buffer_limit: usize,
    /// What to do with a tuple that fails to parse.
    #[serde(default)]
    pub on_parse_error: ParseErrorStrategy,
}

fn default_parser_parallelism() -> usize {
    8
}

fn default_buffer_limit() -> usize {
    1024
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parser_parallelism: default_parser_parallelism(),
            buffer_limit: default_buffer_limit(),
            on_parse_error: ParseErrorStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorStrategy {
    Drop,
    Abort,
}

impl Default for ParseErrorStrategy {
    fn default() -> Self {
        ParseErrorStrategy::Abort
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_breakins_path")]
    pub breakins_path: PathBuf,
    #[serde(default = "default_exec_time_path")]
    pub exec_time_path: PathBuf,
    pub successes_path: Option<PathBuf>,
    pub real_time_path: Option<PathBuf>,
}

fn default_breakins_path() -> PathBuf {
    PathBuf::from("Breakins.txt")
}

fn default_exec_time_path() -> PathBuf {
    PathBuf::from("ExecTime.txt")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            breakins_path: default_breakins_path(),
            exec_time_path: default_exec_time_path(),
            successes_path: None,
            real_time_path: None,
        }
    }
}
