use crate::pipeline::types::Start;
use chrono::Utc;
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open source file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read line from '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens `path` as a gzip-compressed text file and spawns a blocking task
/// that yields its lines in file order onto `output`, closing the channel
/// at end-of-stream. Returns the `Start` barrier the
/// throughput monitor measures from, plus a handle to join on completion.
pub fn spawn_line_source(
    path: PathBuf,
    output: mpsc::Sender<String>,
) -> (Start, JoinHandle<Result<(), ReaderError>>) {
    let start = Start(Utc::now());
    let handle = tokio::task::spawn_blocking(move || read_lines_blocking(&path, &output));
    (start, handle)
}

fn read_lines_blocking(path: &Path, output: &mpsc::Sender<String>) -> Result<(), ReaderError> {
    let file = std::fs::File::open(path).map_err(|source| ReaderError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(GzDecoder::new(file));

    info!(path = %path.display(), "source stage opened file");
    let mut count = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|source| ReaderError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "read line");
        if output.blocking_send(line).is_err() {
            break;
        }
        count += 1;
    }
    info!(path = %path.display(), lines = count, "source stage reached end of stream");
    Ok(())
}
