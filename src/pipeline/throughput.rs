use crate::pipeline::types::{Breakin, Start, ThroughputReport, Total};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

#[derive(Debug, Error)]
pub enum ThroughputError {
    #[error("upstream sequencer never reported a total")]
    TotalNotReported,

    #[error("breakin sink channel closed")]
    ChannelClosed,
}

/// Sits between the Correlator and the Sink, passing every `Breakin`
/// through untouched while watching for the close of that stream. Once the
/// stream closes *and* the line sequencer's `Total` has resolved, computes
/// and returns a single terminal throughput reading — this
/// rendition adopts one terminal emission rather than speculative
/// mid-run readings, per the Open Question resolved in DESIGN.md.
pub async fn run_throughput_monitor(
    start: Start,
    total_rx: oneshot::Receiver<Total>,
    mut breakins_in: mpsc::Receiver<Breakin>,
    breakins_out: mpsc::Sender<Breakin>,
) -> Result<ThroughputReport, ThroughputError> {
    while let Some(breakin) = breakins_in.recv().await {
        breakins_out
            .send(breakin)
            .await
            .map_err(|_| ThroughputError::ChannelClosed)?;
    }

    let Total(total_lines) = total_rx.await.map_err(|_| ThroughputError::TotalNotReported)?;
    let elapsed_seconds = (Utc::now() - start.0).num_milliseconds() as f64 / 1000.0;
    let throughput = if elapsed_seconds > 0.0 {
        total_lines as f64 / elapsed_seconds
    } else {
        0.0
    };

    let report = ThroughputReport {
        elapsed_seconds,
        total_lines,
        throughput,
    };
    info!(?report, "throughput monitor reached terminal reading");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn forwards_every_breakin_and_reports_total() {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (total_tx, total_rx) = oneshot::channel();

        let start = Start(Utc::now() - Duration::seconds(2));
        in_tx
            .send(Breakin {
                time: Utc::now(),
                rhost: "10.0.0.1".to_string(),
                user: "alice".to_string(),
            })
            .await
            .unwrap();
        drop(in_tx);
        total_tx.send(Total(42)).unwrap();

        let report = run_throughput_monitor(start, total_rx, in_rx, out_tx).await.unwrap();
        assert_eq!(report.total_lines, 42);
        assert!(report.elapsed_seconds >= 2.0);

        let forwarded = out_rx.recv().await.unwrap();
        assert_eq!(forwarded.user, "alice");
    }

    #[tokio::test]
    async fn errors_if_total_never_reported() {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, _out_rx) = mpsc::channel(8);
        let (total_tx, total_rx) = oneshot::channel::<Total>();
        drop(in_tx);
        drop(total_tx);

        let result = run_throughput_monitor(Start(Utc::now()), total_rx, in_rx, out_tx).await;
        assert!(matches!(result, Err(ThroughputError::TotalNotReported)));
    }
}
