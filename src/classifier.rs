//! URL classification strategies.
//!
//! Two interchangeable strategies share one contract: given a URL, return a
//! [`Verdict`] or a classifier error. The remote strategy records every
//! attempt in the check log before returning.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::check_record::CheckRecord;
use crate::config::AppConfig;
use crate::errors::{PhishError, PhishResult};
use crate::log_store::LogWriter;
use crate::safe_browsing::SafeBrowsingClient;
use crate::sanitize::sanitize_url;

/// Substrings that make the keyword strategy report a threat.
pub const SUSPICIOUS_KEYWORDS: [&str; 7] = [
    "login", "update", "secure", "verify", "account", "banking", "paypal",
];

pub const UNKNOWN_METHOD_MESSAGE: &str = "Unknown detection method selected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Threat,
    Safe,
}

impl Verdict {
    /// Token written to the check log.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Threat => "Phishing",
            Verdict::Safe => "Safe",
        }
    }
}

impl From<bool> for Verdict {
    fn from(is_threat: bool) -> Self {
        if is_threat {
            Verdict::Threat
        } else {
            Verdict::Safe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Keyword,
    Remote,
}

impl Method {
    /// Form token for this method.
    pub fn as_token(&self) -> &'static str {
        match self {
            Method::Keyword => "dummy",
            Method::Remote => "google",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Method::Keyword => "Dummy Keyword Matching",
            Method::Remote => "Google Safe Browsing API",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Method {
    type Err = PhishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dummy" | "keyword" => Ok(Method::Keyword),
            "google" | "remote" => Ok(Method::Remote),
            _ => Err(PhishError::validation("method", UNKNOWN_METHOD_MESSAGE)),
        }
    }
}

/// Case-insensitive denylist match. No I/O, cannot fail.
pub fn keyword_check(url: &str) -> Verdict {
    let lowered = url.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .any(|kw| lowered.contains(kw))
        .into()
}

pub struct Classifier {
    remote: SafeBrowsingClient,
    log: Arc<LogWriter>,
    log_keyword_checks: bool,
}

impl Classifier {
    pub fn new(config: &AppConfig, log: Arc<LogWriter>) -> PhishResult<Self> {
        let remote =
            SafeBrowsingClient::new(config.safe_browsing.clone(), config.google_api_key.clone())?;
        Ok(Self::from_parts(remote, log, config.log_keyword_checks))
    }

    pub fn from_parts(remote: SafeBrowsingClient, log: Arc<LogWriter>, log_keyword_checks: bool) -> Self {
        Self {
            remote,
            log,
            log_keyword_checks,
        }
    }

    pub fn log_writer(&self) -> &Arc<LogWriter> {
        &self.log
    }

    /// Classify `url` with the chosen strategy.
    ///
    /// Blank input must be rejected before calling this.
    pub async fn classify(&self, url: &str, method: Method) -> PhishResult<Verdict> {
        match method {
            Method::Keyword => {
                let verdict = keyword_check(url);
                if self.log_keyword_checks {
                    self.record(CheckRecord::local(Utc::now(), &sanitize_url(url), verdict))
                        .await;
                }
                tracing::debug!(method = %method, verdict = verdict.label(), "keyword check");
                Ok(verdict)
            }
            Method::Remote => self.remote_check(url).await,
        }
    }

    // File append runs on the blocking pool; it has finished when this returns.
    async fn record(&self, record: CheckRecord) {
        let log = Arc::clone(&self.log);
        if let Err(e) = tokio::task::spawn_blocking(move || log.append_or_report(&record)).await {
            tracing::error!(error = %e, "check log writer task failed");
        }
    }

    async fn remote_check(&self, url: &str) -> PhishResult<Verdict> {
        let sanitized = sanitize_url(url);

        match self.remote.find_threat_matches(url).await {
            Ok(outcome) => {
                let verdict = Verdict::from(outcome.is_threat());
                self.record(CheckRecord::success(
                    Utc::now(),
                    &sanitized,
                    outcome.status,
                    outcome.latency,
                    verdict,
                ))
                .await;
                tracing::info!(
                    url = %sanitized,
                    status = outcome.status,
                    latency_ms = outcome.latency.as_millis() as u64,
                    verdict = verdict.label(),
                    "remote lookup complete"
                );
                Ok(verdict)
            }
            Err(e) => {
                let message = format!("API error: {e}");
                self.record(CheckRecord::failure(Utc::now(), &sanitized, &message))
                    .await;
                tracing::warn!(url = %sanitized, error = %e, "remote lookup failed");
                Err(PhishError::classifier(message))
            }
        }
    }
}
