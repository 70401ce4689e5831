use crate::pipeline::types::Failure;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FailureParseError {
    #[error("no recognizable key=value fields in failure message: {0:?}")]
    NoFields(String),
}

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<key>[A-Za-z_]+)=(?P<value>\S*)").unwrap())
}

/// Parses a `pam_unix(sshd:auth): authentication failure; ...` message body
/// into its `uid`/`euid`/`tty`/`rhost`/`user` fields.
///
/// Any individual field missing from the message yields the empty string —
/// per spec that's a sentinel downstream logic acts on, not an error. Only
/// a message carrying no recognizable `key=value` tokens at all is treated
/// as malformed.
pub fn parse_failure_message(
    seqno: u64,
    time: DateTime<Utc>,
    message: &str,
) -> Result<Failure, FailureParseError> {
    let mut uid = String::new();
    let mut euid = String::new();
    let mut tty = String::new();
    let mut rhost = String::new();
    let mut user = String::new();
    let mut found_any = false;

    for caps in field_regex().captures_iter(message) {
        found_any = true;
        let value = caps["value"].to_string();
        match &caps["key"] {
            "uid" => uid = value,
            "euid" => euid = value,
            "tty" => tty = value,
            "rhost" => rhost = value,
            "user" => user = value,
            _ => {}
        }
    }

    if !found_any {
        return Err(FailureParseError::NoFields(message.to_string()));
    }

    Ok(Failure {
        seqno,
        time,
        uid,
        euid,
        tty,
        rhost,
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, 6, 14, 15, 16, 1).unwrap()
    }

    #[test]
    fn extracts_all_fields() {
        let f = parse_failure_message(
            1,
            ts(),
            "pam_unix(sshd:auth): authentication failure; logname= uid=0 euid=0 tty=ssh ruser= rhost=218.25.123.45  user=root",
        )
        .unwrap();
        assert_eq!(f.uid, "0");
        assert_eq!(f.euid, "0");
        assert_eq!(f.tty, "ssh");
        assert_eq!(f.rhost, "218.25.123.45");
        assert_eq!(f.user, "root");
    }

    #[test]
    fn missing_user_is_empty_sentinel_not_an_error() {
        let f = parse_failure_message(
            1,
            ts(),
            "pam_unix(sshd:auth): authentication failure; logname= uid=0 euid=0 tty=ssh ruser= rhost=1.2.3.4",
        )
        .unwrap();
        assert_eq!(f.user, "");
    }

    #[test]
    fn no_fields_at_all_is_an_error() {
        let err = parse_failure_message(1, ts(), "this message has no key value pairs");
        assert!(matches!(err, Err(FailureParseError::NoFields(_))));
    }
}
