use crate::pipeline::types::LogLine;
use chrono::{NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineParseError {
    #[error("line has fewer than 6 whitespace-separated tokens: {0:?}")]
    TooFewTokens(String),

    #[error("invalid syslog timestamp '{month} {day} {time}': {source}")]
    BadTimestamp {
        month: String,
        day: String,
        time: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parses one positional syslog line — `month day hh:mm:ss hostname service
/// message...` — into a [`LogLine`], stamping the configured year onto the
/// otherwise year-less syslog timestamp.
pub fn parse_log_line(
    seqno: u64,
    syslog_year: i32,
    raw: &str,
) -> Result<LogLine, LineParseError> {
    let mut tokens = raw.split_whitespace();
    let too_few = || LineParseError::TooFewTokens(raw.to_string());

    let month = tokens.next().ok_or_else(too_few)?;
    let day = tokens.next().ok_or_else(too_few)?;
    let time = tokens.next().ok_or_else(too_few)?;
    let hostname = tokens.next().ok_or_else(too_few)?;
    let service = tokens.next().ok_or_else(too_few)?;
    let message: String = {
        let rest: Vec<&str> = tokens.collect();
        rest.join(" ")
    };

    let padded_day = if day.len() == 1 {
        format!("0{day}")
    } else {
        day.to_string()
    };
    let stamp = format!("{syslog_year} {month} {padded_day} {time}");
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M:%S").map_err(|source| {
        LineParseError::BadTimestamp {
            month: month.to_string(),
            day: day.to_string(),
            time: time.to_string(),
            source,
        }
    })?;

    Ok(LogLine {
        seqno,
        time: Utc.from_utc_datetime(&naive),
        hostname: hostname.to_string(),
        service: service.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_line() {
        let line = parse_log_line(
            1,
            2011,
            "Jun 14 15:16:01 combo sshd[1839]: pam_unix(sshd:auth): authentication failure; logname= uid=0 euid=0 tty=ssh ruser= rhost=218.25.123.45  user=root",
        )
        .unwrap();

        assert_eq!(line.hostname, "combo");
        assert_eq!(line.service, "sshd[1839]:");
        assert!(line.message.contains("authentication failure"));
        assert_eq!(line.time.format("%Y-%m-%d %H:%M:%S").to_string(), "2011-06-14 15:16:01");
    }

    #[test]
    fn pads_single_digit_days() {
        let line = parse_log_line(1, 2011, "Jun 1 00:00:01 host sshd[1]: hi").unwrap();
        assert_eq!(line.time.format("%m-%d").to_string(), "06-01");
    }

    #[test]
    fn rejects_truncated_lines() {
        let err = parse_log_line(1, 2011, "Jun 14 15:16:01 combo");
        assert!(matches!(err, Err(LineParseError::TooFewTokens(_))));
    }
}
