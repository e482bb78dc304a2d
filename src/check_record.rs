//! One line of the check log.
//!
//! A record is five comma-separated fields:
//! `timestamp,level,sanitized_url,status,result`. Only the first four commas
//! delimit; the result field may itself contain commas (a success result is
//! `<latency>,<verdict>`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::classifier::Verdict;
use crate::sanitize::ABSENT;

/// Number of fields in a complete record.
pub const FIELD_COUNT: usize = 5;
/// Records with fewer fields than this are malformed.
pub const MIN_FIELDS: usize = 4;

pub const STATUS_ERROR: &str = "ERROR";
pub const LOG_FILE_NOT_FOUND: &str = "Log file not found.";

/// Severity tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "INFO" => Ok(LogLevel::Info),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// A single classification attempt as stored in the check log.
///
/// Fields hold the on-disk text so that anything read back from the log,
/// including lines written by other tools, can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub timestamp: String,
    pub level: String,
    pub sanitized_url: String,
    pub status: String,
    pub result: String,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_latency(latency: Option<Duration>) -> String {
    match latency {
        Some(d) => format!("{:.3}", d.as_secs_f64()),
        None => ABSENT.to_string(),
    }
}

impl CheckRecord {
    /// A remote lookup that produced a verdict.
    pub fn success(
        at: DateTime<Utc>,
        sanitized_url: &str,
        status: u16,
        latency: Duration,
        verdict: Verdict,
    ) -> Self {
        Self {
            timestamp: format_timestamp(at),
            level: LogLevel::Info.to_string(),
            sanitized_url: sanitized_url.to_string(),
            status: status.to_string(),
            result: format!("{},{}", format_latency(Some(latency)), verdict.label()),
        }
    }

    /// A verdict reached without any HTTP exchange (keyword strategy).
    pub fn local(at: DateTime<Utc>, sanitized_url: &str, verdict: Verdict) -> Self {
        Self {
            timestamp: format_timestamp(at),
            level: LogLevel::Info.to_string(),
            sanitized_url: sanitized_url.to_string(),
            status: ABSENT.to_string(),
            result: format!("{},{}", format_latency(None), verdict.label()),
        }
    }

    /// A lookup that failed before producing a verdict.
    pub fn failure(at: DateTime<Utc>, sanitized_url: &str, message: &str) -> Self {
        Self {
            timestamp: format_timestamp(at),
            level: LogLevel::Error.to_string(),
            sanitized_url: sanitized_url.to_string(),
            status: STATUS_ERROR.to_string(),
            result: message.to_string(),
        }
    }

    /// Stand-in record shown when the log cannot be read.
    pub fn placeholder(message: &str) -> Self {
        Self {
            timestamp: ABSENT.to_string(),
            level: LogLevel::Error.to_string(),
            sanitized_url: ABSENT.to_string(),
            status: ABSENT.to_string(),
            result: message.to_string(),
        }
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.level.parse().ok()
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Render as one log line, without the trailing newline.
    pub fn to_line(&self) -> String {
        [
            delimited_field(&self.timestamp),
            delimited_field(&self.level),
            delimited_field(&self.sanitized_url),
            delimited_field(&self.status),
            trailing_field(&self.result),
        ]
        .join(",")
    }

    /// Parse one log line. Returns `None` for malformed lines.
    ///
    /// The line is split on at most the first four commas; a missing fifth
    /// field defaults to `-`. Only the line terminator is stripped, so the
    /// result field keeps any surrounding whitespace.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts: Vec<&str> = line.splitn(FIELD_COUNT, ',').collect();
        if parts.len() < MIN_FIELDS {
            return None;
        }

        Some(Self {
            timestamp: parts[0].to_string(),
            level: parts[1].to_string(),
            sanitized_url: parts[2].to_string(),
            status: parts[3].to_string(),
            result: parts.get(4).copied().unwrap_or(ABSENT).to_string(),
        })
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

// The first four fields must not contain the delimiter.
fn delimited_field(value: &str) -> String {
    let v = single_line(value).replace(',', "%2C");
    if v.trim().is_empty() {
        ABSENT.to_string()
    } else {
        v
    }
}

// Written verbatim apart from line breaks.
fn trailing_field(value: &str) -> String {
    if value.is_empty() {
        ABSENT.to_string()
    } else {
        single_line(value)
    }
}
