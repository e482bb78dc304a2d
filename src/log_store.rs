//! Append-only check log.
//!
//! `LogWriter` appends one [`CheckRecord`] per line; [`read_recent`] parses
//! the same file back for the dashboard. The file is never rewritten.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::check_record::{CheckRecord, LOG_FILE_NOT_FOUND};
use crate::errors::{PhishError, PhishResult, SafeLock};

/// Appends check records to the shared log file.
///
/// Appends from one process are serialised so concurrent requests never
/// interleave partial lines.
pub struct LogWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single write of a complete line.
    pub fn append_record(&self, record: &CheckRecord) -> PhishResult<()> {
        let mut line = record.to_line();
        line.push('\n');

        let _guard = self.lock.safe_lock("check_log")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PhishError::storage(format!("opening {}", self.path.display()), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| PhishError::storage("appending check record", e))?;
        Ok(())
    }

    /// Append, reporting failure through tracing instead of to the caller.
    pub fn append_or_report(&self, record: &CheckRecord) {
        if let Err(e) = self.append_record(record) {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                cause = ?std::error::Error::source(&e).map(|s| s.to_string()),
                "failed to append check record"
            );
        }
    }
}

// Keeps only the last `limit` well-formed records of the file.
fn parse_tail(file: File, limit: usize) -> PhishResult<VecDeque<CheckRecord>> {
    let mut reader = BufReader::new(file);
    let mut records = VecDeque::with_capacity(limit.min(1024));
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| PhishError::storage("reading check log", e))?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(record) = CheckRecord::parse_line(&line) {
            if records.len() == limit {
                records.pop_front();
            }
            records.push_back(record);
        }
    }

    Ok(records)
}

/// Most recent records first, at most `limit` of them.
///
/// Never fails: a missing file yields a single "Log file not found."
/// record, any other read failure a single record describing the cause.
pub fn read_recent(path: &Path, limit: usize) -> Vec<CheckRecord> {
    if limit == 0 {
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "check log does not exist yet");
            return vec![CheckRecord::placeholder(LOG_FILE_NOT_FOUND)];
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot open check log");
            return vec![CheckRecord::placeholder(&format!("Failed to read log file: {e}"))];
        }
    };

    match parse_tail(file, limit) {
        Ok(records) => records.into_iter().rev().collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read check log");
            let cause = std::error::Error::source(&e)
                .map(|s| s.to_string())
                .unwrap_or_else(|| e.to_string());
            vec![CheckRecord::placeholder(&format!("Failed to read log file: {cause}"))]
        }
    }
}
