use crate::pipeline::types::{Sequenced, Total};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("sequencer output channel closed")]
    ChannelClosed,
}

/// Assigns a 1-based, contiguous sequence number to every tuple it receives,
/// forwarding each as `Sequenced::Item` and, once `input` closes, a single
/// `Sequenced::End` carrying the total count.
///
/// Generic so the same operator backs both the top-level line sequencer and
/// the failure re-sequencer.
pub async fn run_sequencer<T: Send + 'static>(
    mut input: mpsc::Receiver<T>,
    output: mpsc::Sender<Sequenced<T>>,
    name: &str,
) -> Result<(), SequencerError> {
    info!(sequencer = name, "sequencer started");
    let mut next: u64 = 1;

    while let Some(value) = input.recv().await {
        debug!(sequencer = name, seqno = next, "numbered tuple");
        output
            .send(Sequenced::Item {
                seqno: next,
                value,
            })
            .await
            .map_err(|_| SequencerError::ChannelClosed)?;
        next += 1;
    }

    let total = next - 1;
    info!(sequencer = name, total, "sequencer reached end of stream");
    output
        .send(Sequenced::End(Total(total)))
        .await
        .map_err(|_| SequencerError::ChannelClosed)?;
    Ok(())
}
