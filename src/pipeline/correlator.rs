use crate::pipeline::types::{Breakin, Success, Suspect};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CorrelatorError {
    #[error("correlator output channel closed")]
    ChannelClosed,
}

/// Scans `list` in order for the first entry whose `diff_fn` result (always
/// `success.time - suspect.last`, regardless of which side just arrived)
/// lands within `[-60, 60]` — the absolute-value window required by the
/// match invariant, not the one-directional `[0, 60]` a literal reading of
/// the per-handler pseudocode would suggest, since that alone can never
/// match a success that arrived chronologically before its suspect.
/// Removes and returns the match, and purges the prefix up to and
/// including the highest-index entry for which `is_stale` holds — those
/// entries can never match any later arrival either, because both streams
/// are time-ordered post-OPM, but which direction is "stale" depends on
/// which list is being scanned (see the two call sites below).
fn scan_and_purge<T>(
    list: &mut VecDeque<T>,
    diff_fn: impl Fn(&T) -> f64,
    is_stale: impl Fn(f64) -> bool,
) -> Option<T> {
    let mut stale_hi: Option<usize> = None;
    let mut matched_idx: Option<usize> = None;

    for (i, item) in list.iter().enumerate() {
        let diff = diff_fn(item);
        if (-60.0..=60.0).contains(&diff) {
            matched_idx = Some(i);
            break;
        } else if is_stale(diff) {
            stale_hi = Some(i);
        }
    }

    let matched = matched_idx.map(|idx| list.remove(idx).expect("index came from iter()"));
    if let Some(hi) = stale_hi {
        for _ in 0..=hi {
            list.pop_front();
        }
    }
    matched
}

fn seconds(lhs: chrono::DateTime<chrono::Utc>, rhs: chrono::DateTime<chrono::Utc>) -> f64 {
    (lhs - rhs).num_milliseconds() as f64 / 1000.0
}

/// Two-input stream join matching a `Suspect` against a later-or-earlier
/// `Success` for the same user within ±60 seconds. Runs as a
/// single consumer task selecting between both input channels so the
/// per-user maps are never touched concurrently.
pub async fn run_correlator(
    mut suspects_in: mpsc::Receiver<Suspect>,
    mut successes_in: mpsc::Receiver<Success>,
    output: mpsc::Sender<Breakin>,
) -> Result<(), CorrelatorError> {
    let mut suspects: HashMap<String, VecDeque<Suspect>> = HashMap::new();
    let mut logins: HashMap<String, VecDeque<Success>> = HashMap::new();
    let mut suspects_open = true;
    let mut successes_open = true;
    let mut emitted = 0u64;

    while suspects_open || successes_open {
        tokio::select! {
            biased;

            maybe = suspects_in.recv(), if suspects_open => {
                match maybe {
                    Some(s) => {
                        handle_suspect(s, &mut suspects, &mut logins, &output, &mut emitted).await?;
                    }
                    None => suspects_open = false,
                }
            }

            maybe = successes_in.recv(), if successes_open => {
                match maybe {
                    Some(l) => {
                        handle_success(l, &mut suspects, &mut logins, &output, &mut emitted).await?;
                    }
                    None => successes_open = false,
                }
            }
        }
    }

    info!(emitted, "correlator reached end of stream on both inputs");
    Ok(())
}

async fn handle_suspect(
    s: Suspect,
    suspects: &mut HashMap<String, VecDeque<Suspect>>,
    logins: &mut HashMap<String, VecDeque<Success>>,
    output: &mpsc::Sender<Breakin>,
    emitted: &mut u64,
) -> Result<(), CorrelatorError> {
    if s.user.is_empty() {
        debug!("dropping suspect with empty-user sentinel");
        return Ok(());
    }

    let login_list = logins.entry(s.user.clone()).or_default();
    let last = s.last;
    // Suspects for a user arrive with non-decreasing `last`, so diff =
    // login.time - last only ever shrinks for a given stored login as more
    // suspects land; once it drops below -60 no future suspect can revive it.
    if let Some(matched) = scan_and_purge(
        login_list,
        |l: &Success| seconds(l.time, last),
        |diff| diff < -60.0,
    ) {
        output
            .send(Breakin {
                time: matched.time,
                rhost: s.rhost.clone(),
                user: s.user.clone(),
            })
            .await
            .map_err(|_| CorrelatorError::ChannelClosed)?;
        *emitted += 1;
        debug!(user = %s.user, rhost = %s.rhost, "breakin matched on suspect arrival");
    } else {
        suspects.entry(s.user.clone()).or_default().push_back(s);
    }
    Ok(())
}

async fn handle_success(
    l: Success,
    suspects: &mut HashMap<String, VecDeque<Suspect>>,
    logins: &mut HashMap<String, VecDeque<Success>>,
    output: &mpsc::Sender<Breakin>,
    emitted: &mut u64,
) -> Result<(), CorrelatorError> {
    let suspect_list = suspects.entry(l.user.clone()).or_default();
    let login_time = l.time;
    // Successes for a user arrive with non-decreasing `time`, so diff =
    // login_time - last only ever grows for a given stored suspect as more
    // successes land; once it exceeds 60 no future success can revive it.
    if let Some(matched) = scan_and_purge(
        suspect_list,
        |s: &Suspect| seconds(login_time, s.last),
        |diff| diff > 60.0,
    ) {
        output
            .send(Breakin {
                time: l.time,
                rhost: matched.rhost.clone(),
                user: l.user.clone(),
            })
            .await
            .map_err(|_| CorrelatorError::ChannelClosed)?;
        *emitted += 1;
        debug!(user = %l.user, rhost = %matched.rhost, "breakin matched on success arrival");
    } else {
        logins.entry(l.user.clone()).or_default().push_back(l);
    }
    Ok(())
}
