use crate::pipeline::types::{Breakin, Success, ThroughputReport};
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write sink file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Drains the terminal `Breakin` stream to `path`, one `time rhost user`
/// record per line. Returns the number of records written.
pub async fn run_breakin_sink(
    mut input: mpsc::Receiver<Breakin>,
    path: &Path,
) -> Result<u64, SinkError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| io_err(path, e))?;
    let mut writer = tokio::io::BufWriter::new(file);
    let mut count = 0u64;

    while let Some(breakin) = input.recv().await {
        let line = format!(
            "{} {} {}\n",
            breakin.time.format("%Y-%m-%d %H:%M:%S"),
            breakin.rhost,
            breakin.user
        );
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_err(path, e))?;
        count += 1;
    }

    writer.flush().await.map_err(|e| io_err(path, e))?;
    info!(path = %path.display(), count, "wrote breakin sink");
    Ok(count)
}

/// Overwrites `path` with the single most recent throughput reading,
/// `elapsed total throughput`.
pub async fn write_throughput_report(
    path: &Path,
    report: ThroughputReport,
) -> Result<(), SinkError> {
    let content = format!(
        "{:.3} {} {:.3}\n",
        report.elapsed_seconds, report.total_lines, report.throughput
    );
    tokio::fs::write(path, content)
        .await
        .map_err(|e| io_err(path, e))?;
    info!(path = %path.display(), ?report, "wrote throughput report");
    Ok(())
}

/// Optional diagnostic: one `time user` line per successful login, active
/// only when `output.successes_path` is configured.
pub async fn run_success_diagnostic_sink(
    mut input: mpsc::Receiver<Success>,
    path: &Path,
) -> Result<u64, SinkError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| io_err(path, e))?;
    let mut writer = tokio::io::BufWriter::new(file);
    let mut count = 0u64;

    while let Some(success) = input.recv().await {
        let line = format!("{} {}\n", success.time.format("%Y-%m-%d %H:%M:%S"), success.user);
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_err(path, e))?;
        count += 1;
    }

    writer.flush().await.map_err(|e| io_err(path, e))?;
    info!(path = %path.display(), count, "wrote success diagnostic sink");
    Ok(count)
}

/// Optional diagnostic: a single `start end` wall-clock record for the run,
/// active only when `output.real_time_path` is configured.
pub async fn write_real_time_diagnostic(
    path: &Path,
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> Result<(), SinkError> {
    let content = format!(
        "{} {}\n",
        start.format("%Y-%m-%d %H:%M:%S%.3f"),
        end.format("%Y-%m-%d %H:%M:%S%.3f")
    );
    tokio::fs::write(path, content)
        .await
        .map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Forwards every item received on `input` to both `out_a` and `out_b`,
/// used to tap the success stream for the optional diagnostic sink without
/// disturbing the Correlator's own copy.
pub async fn tee<T: Clone + Send + 'static>(
    mut input: mpsc::Receiver<T>,
    out_a: mpsc::Sender<T>,
    out_b: mpsc::Sender<T>,
) -> Result<(), SinkError> {
    while let Some(item) = input.recv().await {
        if out_a.send(item.clone()).await.is_err() {
            break;
        }
        if out_b.send(item).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Removes the optional diagnostic files if present, per the `clean`
/// subcommand. Missing files are not an error.
pub async fn clean_diagnostics(paths: &[&Path]) -> Result<Vec<String>, SinkError> {
    let mut removed = Vec::new();
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => removed.push(path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(path, e)),
        }
    }
    Ok(removed)
}
