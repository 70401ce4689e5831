use crate::pipeline::types::{LogLine, Sequenced, Success, Total};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier output channel closed")]
    ChannelClosed,
}

fn is_failure_line(line: &LogLine) -> bool {
    line.service.contains("sshd") && line.message.contains("authentication failure")
}

fn success_user_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"session opened for user (?P<user>\S+)").unwrap())
}

/// Extracts `user` from a `session opened for user <name>` message, or
/// `None` if the line isn't a success line at all.
fn parse_success_line(line: &LogLine) -> Option<Success> {
    if !line.service.contains("sshd") {
        return None;
    }
    let user = success_user_regex().captures(&line.message)?["user"].to_string();
    Some(Success {
        time: line.time,
        user,
    })
}

/// Splits the merged `LogLine` stream into a failure branch (forwarded, not
/// yet parsed, for the failure re-sequencer/fan-out/OPM) and a success branch
/// (parsed inline, since only failures need the heavier re-sequencing pass).
/// Lines matching neither predicate are discarded.
///
/// The upstream OPM's terminal `Total` (the overall line count) is
/// otherwise invisible past this point in the pipeline; it is forwarded out
/// through `total_out` so the throughput monitor can still see it.
pub async fn run_classifier(
    mut input: mpsc::Receiver<Sequenced<LogLine>>,
    failure_out: mpsc::Sender<(DateTime<Utc>, String)>,
    success_out: mpsc::Sender<Success>,
    total_out: oneshot::Sender<Total>,
) -> Result<(), ClassifierError> {
    while let Some(msg) = input.recv().await {
        match msg {
            Sequenced::Item { value: line, .. } => {
                if is_failure_line(&line) {
                    debug!(seqno = line.seqno, "classified as failure");
                    failure_out
                        .send((line.time, line.message))
                        .await
                        .map_err(|_| ClassifierError::ChannelClosed)?;
                } else if let Some(success) = parse_success_line(&line) {
                    debug!(seqno = line.seqno, user = %success.user, "classified as success");
                    success_out
                        .send(success)
                        .await
                        .map_err(|_| ClassifierError::ChannelClosed)?;
                }
            }
            Sequenced::End(total) => {
                let _ = total_out.send(total);
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(seqno: u64, service: &str, message: &str) -> LogLine {
        LogLine {
            seqno,
            time: Utc.with_ymd_and_hms(2011, 6, 14, 15, 16, 1).unwrap(),
            hostname: "combo".to_string(),
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn routes_failures_and_successes_and_drops_the_rest() {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (fail_tx, mut fail_rx) = mpsc::channel(8);
        let (succ_tx, mut succ_rx) = mpsc::channel(8);

        in_tx
            .send(Sequenced::Item {
                seqno: 1,
                value: line(1, "sshd[1]:", "pam_unix(sshd:auth): authentication failure; user=bob"),
            })
            .await
            .unwrap();
        in_tx
            .send(Sequenced::Item {
                seqno: 2,
                value: line(2, "sshd[1]:", "pam_unix(sshd:session): session opened for user bob by (uid=0)"),
            })
            .await
            .unwrap();
        in_tx
            .send(Sequenced::Item {
                seqno: 3,
                value: line(3, "cron[1]:", "unrelated message"),
            })
            .await
            .unwrap();
        in_tx.send(Sequenced::End(crate::pipeline::types::Total(3))).await.unwrap();
        drop(in_tx);

        let (total_tx, total_rx) = tokio::sync::oneshot::channel();
        run_classifier(in_rx, fail_tx, succ_tx, total_tx).await.unwrap();
        assert_eq!(total_rx.await.unwrap(), crate::pipeline::types::Total(3));

        let (time, message) = fail_rx.recv().await.unwrap();
        assert!(message.contains("authentication failure"));
        let _ = time;
        assert!(fail_rx.recv().await.is_none());

        let success = succ_rx.recv().await.unwrap();
        assert_eq!(success.user, "bob");
        assert!(succ_rx.recv().await.is_none());
    }
}
