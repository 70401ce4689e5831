use super::types::{Sequenced, Total};
use crate::config::types::ParseErrorStrategy;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("fan-out channel closed")]
    ChannelClosed,

    #[error("parse error on tuple {seqno}: {message}")]
    ParseAborted { seqno: u64, message: String },

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

/// Reads numbered tuples off `input` and routes each to one of `workers` in
/// round-robin order, forwarding input `seqno`s untouched.
/// Forwards the upstream `Total` through `total_tx` and, by dropping every
/// worker sender, signals each worker's input channel closed so it can
/// finish.
async fn run_dispatcher<T: Send + 'static>(
    mut input: mpsc::Receiver<Sequenced<T>>,
    workers: Vec<mpsc::Sender<(u64, T)>>,
    total_tx: oneshot::Sender<Total>,
    name: &str,
) -> Result<(), FanoutError> {
    let mut next_worker = 0usize;
    let worker_count = workers.len().max(1);

    while let Some(msg) = input.recv().await {
        match msg {
            Sequenced::Item { seqno, value } => {
                let worker = &workers[next_worker % worker_count];
                worker
                    .send((seqno, value))
                    .await
                    .map_err(|_| FanoutError::ChannelClosed)?;
                next_worker = next_worker.wrapping_add(1);
            }
            Sequenced::End(total) => {
                debug!(dispatcher = name, total = total.0, "dispatcher draining");
                let _ = total_tx.send(total);
                drop(workers);
                info!(dispatcher = name, "dispatcher reached end of stream");
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Parses every tuple it receives with a pure `parse` function, forwarding
/// `(seqno, parsed)` downstream. A parse failure is handled per
/// `on_error`: dropped and counted, or treated as fatal for the
/// whole run.
async fn run_parser_worker<T, U, E>(
    mut input: mpsc::Receiver<(u64, T)>,
    output: mpsc::Sender<(u64, U)>,
    parse: impl Fn(u64, T) -> Result<U, E> + Send + 'static,
    on_error: ParseErrorStrategy,
    name: &str,
) -> Result<(), FanoutError>
where
    T: Send + 'static,
    U: Send + 'static,
    E: std::fmt::Display,
{
    let mut dropped = 0u64;
    while let Some((seqno, raw)) = input.recv().await {
        match parse(seqno, raw) {
            Ok(value) => {
                output
                    .send((seqno, value))
                    .await
                    .map_err(|_| FanoutError::ChannelClosed)?;
            }
            Err(e) => {
                warn!(worker = name, seqno, error = %e, "parse error");
                match on_error {
                    ParseErrorStrategy::Drop => {
                        dropped += 1;
                        continue;
                    }
                    ParseErrorStrategy::Abort => {
                        return Err(FanoutError::ParseAborted {
                            seqno,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }
    if dropped > 0 {
        info!(worker = name, dropped, "parser worker finished with dropped tuples");
    }
    Ok(())
}

/// Handle to a running fan-out region: the dispatcher, its P parser
/// workers, the forwarded `Total`, and the P output channels ready to be
/// handed to an [`super::merge::run_opm`] instance.
pub struct FanoutHandle<U> {
    pub dispatcher: JoinHandle<Result<(), FanoutError>>,
    pub workers: Vec<JoinHandle<Result<(), FanoutError>>>,
    pub total_rx: oneshot::Receiver<Total>,
    pub outputs: Vec<mpsc::Receiver<(u64, U)>>,
}

/// Wires up a full parallel region: one dispatcher task plus `parallelism`
/// parser worker tasks, each fed by its own bounded channel of width
/// `buffer_limit`.
pub fn spawn_fanout<T, U, E>(
    input: mpsc::Receiver<Sequenced<T>>,
    parallelism: usize,
    buffer_limit: usize,
    parse: impl Fn(u64, T) -> Result<U, E> + Clone + Send + 'static,
    on_error: ParseErrorStrategy,
    name: &'static str,
) -> FanoutHandle<U>
where
    T: Send + 'static,
    U: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let parallelism = parallelism.max(1);
    let mut worker_inputs = Vec::with_capacity(parallelism);
    let mut worker_input_rxs = Vec::with_capacity(parallelism);
    for _ in 0..parallelism {
        let (tx, rx) = mpsc::channel(buffer_limit);
        worker_inputs.push(tx);
        worker_input_rxs.push(rx);
    }

    let mut outputs = Vec::with_capacity(parallelism);
    let mut worker_handles = Vec::with_capacity(parallelism);
    for (idx, worker_rx) in worker_input_rxs.into_iter().enumerate() {
        let (out_tx, out_rx) = mpsc::channel(buffer_limit);
        outputs.push(out_rx);
        let parse = parse.clone();
        let worker_name = format!("{name}[{idx}]");
        worker_handles.push(tokio::spawn(async move {
            run_parser_worker(worker_rx, out_tx, parse, on_error, &worker_name).await
        }));
    }

    let (total_tx, total_rx) = oneshot::channel();
    let dispatcher = tokio::spawn(run_dispatcher(input, worker_inputs, total_tx, name));

    FanoutHandle {
        dispatcher,
        workers: worker_handles,
        total_rx,
        outputs,
    }
}
