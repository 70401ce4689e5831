use crate::config::types::Config;
use crate::pipeline::backpressure::BackpressureHandler;
use crate::pipeline::channel::create_channel;
use crate::pipeline::classifier::{run_classifier, ClassifierError};
use crate::pipeline::correlator::{run_correlator, CorrelatorError};
use crate::pipeline::failure_parse::parse_failure_message;
use crate::pipeline::fanout::{spawn_fanout, FanoutError};
use crate::pipeline::merge::{run_opm, OpmError};
use crate::pipeline::parse_line::parse_log_line;
use crate::pipeline::sequencer::{run_sequencer, SequencerError};
use crate::pipeline::suspect::{run_suspect_finder, SuspectFinderError};
use crate::pipeline::throughput::{run_throughput_monitor, ThroughputError};
use crate::pipeline::types::ThroughputReport;
use crate::sink::{self, SinkError};
use crate::source::reader::{spawn_line_source, ReaderError};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("source error: {0}")]
    Source(#[from] ReaderError),

    #[error("sequencer error: {0}")]
    Sequencer(#[from] SequencerError),

    #[error("fan-out error: {0}")]
    Fanout(#[from] FanoutError),

    #[error("order-preserving merge error: {0}")]
    Opm(#[from] OpmError),

    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("suspect finder error: {0}")]
    SuspectFinder(#[from] SuspectFinderError),

    #[error("correlator error: {0}")]
    Correlator(#[from] CorrelatorError),

    #[error("throughput monitor error: {0}")]
    Throughput(#[from] ThroughputError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Outcome of one full pipeline run, reported by the CLI.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub breakins_written: u64,
    pub report: ThroughputReport,
}

/// Wires up every stage in dependency order and drives the run to
/// completion. This is the single place that owns the pipeline's DAG of
/// channels; every operator it spawns is otherwise ignorant of its
/// neighbors.
pub async fn run(config: &Config) -> Result<Summary, RunError> {
    let buf = BackpressureHandler::new(config.pipeline.buffer_limit).channel_buffer_size();
    let parallelism = config.pipeline.parser_parallelism;
    let on_error = config.pipeline.on_parse_error;
    let syslog_year = config.source.syslog_year;

    // --- Source stage + line sequencer ---
    let (raw_tx, raw_rx) = create_channel::<String>(buf);
    let (start, source_handle) = spawn_line_source(config.source.file.clone(), raw_tx);

    let (seq_tx, seq_rx) = create_channel(buf);
    let sequencer_handle = tokio::spawn(run_sequencer(raw_rx, seq_tx, "lines"));

    // --- Parser fan-out + OPM over LogLine ---
    let line_fanout = spawn_fanout(
        seq_rx,
        parallelism,
        buf,
        move |seqno, raw: String| parse_log_line(seqno, syslog_year, &raw),
        on_error,
        "line-parser",
    );
    let line_total_rx = line_fanout.total_rx;
    let line_outputs = line_fanout.outputs;
    let line_fanout_dispatcher = line_fanout.dispatcher;
    let line_fanout_workers = line_fanout.workers;

    let (merged_tx, merged_rx) = create_channel(buf);
    let merge_handle = tokio::spawn(run_opm(line_outputs, line_total_rx, merged_tx, "line-merge"));

    // --- Classifier: split into failure/success branches ---
    let (failure_raw_tx, failure_raw_rx) = create_channel(buf);
    let (success_tx, success_rx) = create_channel(buf);
    let (total_tx, total_rx) = oneshot::channel();
    let classifier_handle = tokio::spawn(run_classifier(
        merged_rx,
        failure_raw_tx,
        success_tx,
        total_tx,
    ));

    // --- Failure re-sequencer + parser fan-out + OPM ---
    let (failure_seq_tx, failure_seq_rx) = create_channel(buf);
    let failure_sequencer_handle =
        tokio::spawn(run_sequencer(failure_raw_rx, failure_seq_tx, "failures"));

    let failure_fanout = spawn_fanout(
        failure_seq_rx,
        parallelism,
        buf,
        move |seqno, (time, message)| parse_failure_message(seqno, time, &message),
        on_error,
        "failure-parser",
    );
    let failure_total_rx = failure_fanout.total_rx;
    let failure_outputs = failure_fanout.outputs;
    let failure_fanout_dispatcher = failure_fanout.dispatcher;
    let failure_fanout_workers = failure_fanout.workers;

    let (failure_merged_tx, failure_merged_rx) = create_channel(buf);
    let failure_merge_handle = tokio::spawn(run_opm(
        failure_outputs,
        failure_total_rx,
        failure_merged_tx,
        "failure-merge",
    ));

    // --- SuspectFinder ---
    let (suspect_tx, suspect_rx) = create_channel(buf);
    let suspect_handle = tokio::spawn(run_suspect_finder(
        failure_merged_rx,
        suspect_tx,
        config.detection.attempts,
        config.detection.window_seconds,
    ));

    // --- Optional success diagnostic tap, then Correlator ---
    let (correlator_success_tx, correlator_success_rx) = create_channel(buf);
    let success_routing_handle: tokio::task::JoinHandle<Result<(), RunError>> =
        if let Some(path) = config.output.successes_path.clone() {
            let (diag_tx, diag_rx) = create_channel(buf);
            tokio::spawn(async move {
                sink::tee(success_rx, correlator_success_tx, diag_tx).await?;
                sink::run_success_diagnostic_sink(diag_rx, &path).await?;
                Ok(())
            })
        } else {
            tokio::spawn(async move {
                let mut rx = success_rx;
                while let Some(success) = rx.recv().await {
                    if correlator_success_tx.send(success).await.is_err() {
                        break;
                    }
                }
                Ok(())
            })
        };

    let (breakin_tx, breakin_rx) = create_channel(buf);
    let correlator_handle = tokio::spawn(run_correlator(
        suspect_rx,
        correlator_success_rx,
        breakin_tx,
    ));

    // --- Throughput monitor + sink ---
    let (sink_tx, sink_rx) = create_channel(buf);
    let throughput_handle =
        tokio::spawn(run_throughput_monitor(start, total_rx, breakin_rx, sink_tx));

    let breakins_path = config.output.breakins_path.clone();
    let sink_handle =
        tokio::spawn(async move { sink::run_breakin_sink(sink_rx, &breakins_path).await });

    // --- Await every stage, surfacing the first error encountered ---
    source_handle.await??;
    sequencer_handle.await??;
    line_fanout_dispatcher.await??;
    for worker in line_fanout_workers {
        worker.await??;
    }
    merge_handle.await??;
    classifier_handle.await??;
    failure_sequencer_handle.await??;
    failure_fanout_dispatcher.await??;
    for worker in failure_fanout_workers {
        worker.await??;
    }
    failure_merge_handle.await??;
    suspect_handle.await??;
    success_routing_handle.await??;
    correlator_handle.await??;
    let report = throughput_handle.await??;
    let breakins_written = sink_handle.await??;

    if let Some(real_time_path) = &config.output.real_time_path {
        sink::write_real_time_diagnostic(real_time_path, start.0, chrono::Utc::now()).await?;
    }
    sink::write_throughput_report(&config.output.exec_time_path, report).await?;

    info!(breakins_written, ?report, "pipeline run complete");
    Ok(Summary {
        breakins_written,
        report,
    })
}
