use super::types::{Sequenced, Total};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum OpmError {
    #[error("order-preserving merger output channel closed")]
    ChannelClosed,
}

/// Re-establishes total order by `seqno` across `inputs`.
///
/// Implements the algorithm exactly as specified: a `next` counter and a
/// `pending` map, draining any contiguous run once `next` itself lands. No
/// heap, no timestamp comparison — ordering is purely by `seqno`. `total`
/// resolves once the upstream sequencer has seen end-of-stream and reports
/// K; the merger forwards `Sequenced::End` once `next` exceeds K.
pub async fn run_opm<U: Send + 'static>(
    mut inputs: Vec<mpsc::Receiver<(u64, U)>>,
    mut total: oneshot::Receiver<Total>,
    output: mpsc::Sender<Sequenced<U>>,
    name: &str,
) -> Result<(), OpmError> {
    info!(opm = name, channels = inputs.len(), "OPM started");
    let mut next: u64 = 1;
    let mut pending: HashMap<u64, U> = HashMap::new();
    let mut known_total: Option<u64> = None;

    loop {
        if let Some(k) = known_total {
            if next > k {
                break;
            }
        }

        tokio::select! {
            biased;

            res = &mut total, if known_total.is_none() => {
                if let Ok(Total(k)) = res {
                    known_total = Some(k);
                }
            }

            item = recv_any(&mut inputs), if !inputs.is_empty() => {
                if let Some((seqno, value)) = item {
                    if seqno == next {
                        output
                            .send(Sequenced::Item { seqno, value })
                            .await
                            .map_err(|_| OpmError::ChannelClosed)?;
                        next += 1;
                        while let Some(v) = pending.remove(&next) {
                            output
                                .send(Sequenced::Item { seqno: next, value: v })
                                .await
                                .map_err(|_| OpmError::ChannelClosed)?;
                            next += 1;
                        }
                    } else {
                        debug!(opm = name, seqno, "buffering out-of-order tuple");
                        pending.insert(seqno, value);
                    }
                }
            }

            else => break,
        }
    }

    debug_assert!(
        pending.is_empty(),
        "OPM exited with {} buffered tuples remaining",
        pending.len()
    );
    let total_count = next - 1;
    output
        .send(Sequenced::End(Total(total_count)))
        .await
        .map_err(|_| OpmError::ChannelClosed)?;
    info!(opm = name, total = total_count, "OPM reached end of stream");
    Ok(())
}

/// Races `recv()` across every still-open receiver, dropping one from the
/// set the moment it closes so a closed channel can never make this spin.
/// Returns `None` only once every receiver has closed.
async fn recv_any<U>(inputs: &mut Vec<mpsc::Receiver<(u64, U)>>) -> Option<(u64, U)> {
    use futures::future::select_all;

    loop {
        if inputs.is_empty() {
            return None;
        }
        let futs = inputs.iter_mut().map(|rx| Box::pin(rx.recv()));
        let (result, idx, _remaining) = select_all(futs).await;
        match result {
            Some(item) => return Some(item),
            None => {
                inputs.remove(idx);
            }
        }
    }
}
