use crate::pipeline::types::{Failure, Sequenced, Suspect};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SuspectFinderError {
    #[error("suspect finder output channel closed")]
    ChannelClosed,
}

/// Partitioned tumbling count window: for each distinct `rhost`, buffers
/// exactly `attempts` consecutive failures before triggering and resetting
/// empty. Partitions are entirely independent and persist for
/// the lifetime of the run — no idle eviction, per spec.
pub async fn run_suspect_finder(
    mut input: mpsc::Receiver<Sequenced<Failure>>,
    output: mpsc::Sender<Suspect>,
    attempts: u32,
    window_seconds: f64,
) -> Result<(), SuspectFinderError> {
    let mut windows: std::collections::HashMap<String, Vec<Failure>> =
        std::collections::HashMap::new();
    let mut emitted = 0u64;

    while let Some(msg) = input.recv().await {
        let failure = match msg {
            Sequenced::Item { value, .. } => value,
            Sequenced::End(_) => break,
        };

        let rhost = failure.rhost.clone();
        let window = windows.entry(rhost.clone()).or_default();
        window.push(failure);

        if window.len() as u32 >= attempts {
            let max_time = window.iter().map(|f| f.time).max().expect("non-empty window");
            let min_time = window.iter().map(|f| f.time).min().expect("non-empty window");
            let diff = (max_time - min_time).num_milliseconds() as f64 / 1000.0;
            let user = window.last().expect("non-empty window").user.clone();

            if diff < window_seconds {
                debug!(rhost = %rhost, user = %user, diff, "suspect window triggered");
                output
                    .send(Suspect {
                        diff,
                        last: max_time,
                        attempts,
                        rhost: rhost.clone(),
                        user,
                    })
                    .await
                    .map_err(|_| SuspectFinderError::ChannelClosed)?;
                emitted += 1;
            } else {
                debug!(rhost = %rhost, diff, window_seconds, "window span too wide, no suspect");
            }
            window.clear();
        }
    }

    info!(emitted, "suspect finder reached end of stream");
    Ok(())
}
