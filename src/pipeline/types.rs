use chrono::{DateTime, Utc};

/// A raw input line tagged with its 1-based position in the source file.
///
/// Produced by the [`crate::pipeline::sequencer`] stage and consumed by the
/// parser fan-out; the `seqno` survives parsing so the OPM can restore order
/// after the parallel region.
#[derive(Debug, Clone)]
pub struct NumberedLine {
    pub seqno: u64,
    pub raw: String,
}

/// A parsed syslog record, still tagged with its originating `seqno`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub seqno: u64,
    pub time: DateTime<Utc>,
    pub hostname: String,
    pub service: String,
    pub message: String,
}

/// A parsed `sshd` authentication-failure message, renumbered within the
/// failure subsequence (its `seqno` is unrelated to the `LogLine` it came
/// from).
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub seqno: u64,
    pub time: DateTime<Utc>,
    pub uid: String,
    pub euid: String,
    pub tty: String,
    pub rhost: String,
    /// Empty string when the message carries no `user=` token; this is a
    /// sentinel the Correlator uses to refuse matching.
    pub user: String,
}

/// A successful SSH login, extracted inline by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub time: DateTime<Utc>,
    pub user: String,
}

/// Emitted by the SuspectFinder when N failures land within T seconds at a
/// single remote host.
#[derive(Debug, Clone, PartialEq)]
pub struct Suspect {
    pub diff: f64,
    pub last: DateTime<Utc>,
    pub attempts: u32,
    pub rhost: String,
    pub user: String,
}

/// Terminal output of the pipeline: a suspect whose account was then used
/// for a successful login within the matching window.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakin {
    pub time: DateTime<Utc>,
    pub rhost: String,
    pub user: String,
}

/// Emitted once by a sequencer at end-of-stream, carrying the total number
/// of tuples it numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Total(pub u64);

/// A sum type threaded through sequenced channels so a single receiver can
/// observe both numbered tuples and the terminal count without a second,
/// racing channel.
#[derive(Debug, Clone)]
pub enum Sequenced<T> {
    Item { seqno: u64, value: T },
    End(Total),
}

/// Marks the instant the source stage began reading, consumed by the
/// throughput monitor.
#[derive(Debug, Clone, Copy)]
pub struct Start(pub DateTime<Utc>);

/// A single emitted throughput reading; later emissions overwrite earlier
/// ones in the sink file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputReport {
    pub elapsed_seconds: f64,
    pub total_lines: u64,
    pub throughput: f64,
}
