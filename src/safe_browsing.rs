//! Client for the Google Safe Browsing v4 `threatMatches:find` lookup.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::SafeBrowsingConfig;
use crate::errors::{PhishError, PhishResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo<'a> {
    client_id: &'a str,
    client_version: &'a str,
}

#[derive(Serialize)]
struct ThreatEntry<'a> {
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatInfo<'a> {
    threat_types: &'a [String],
    platform_types: &'a [String],
    threat_entry_types: [&'static str; 1],
    threat_entries: [ThreatEntry<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindThreatMatchesRequest<'a> {
    client: ClientInfo<'a>,
    threat_info: ThreatInfo<'a>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatMatch {
    #[serde(default)]
    pub threat_type: Option<String>,
    #[serde(default)]
    pub platform_type: Option<String>,
    #[serde(default)]
    pub threat_entry_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FindThreatMatchesResponse {
    #[serde(default)]
    matches: Option<Vec<ThreatMatch>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Successful exchange with the lookup service.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub status: u16,
    pub latency: Duration,
    pub matches: Vec<ThreatMatch>,
}

impl LookupOutcome {
    pub fn is_threat(&self) -> bool {
        !self.matches.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Google Safe Browsing API key is not configured")]
    MissingApiKey,
    #[error("request timed out after {timeout_ms} ms ({detail})")]
    Timeout { timeout_ms: u64, detail: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}

#[derive(Clone)]
pub struct SafeBrowsingClient {
    http: reqwest::Client,
    config: SafeBrowsingConfig,
    api_key: Option<String>,
}

impl SafeBrowsingClient {
    pub fn new(config: SafeBrowsingConfig, api_key: Option<String>) -> PhishResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("phishwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PhishError::network("creating HTTP client", e))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Look a single URL up. Any failure is returned as a [`LookupError`];
    /// the API key never appears in its text.
    pub async fn find_threat_matches(&self, url: &str) -> Result<LookupOutcome, LookupError> {
        let key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;

        let body = FindThreatMatchesRequest {
            client: ClientInfo {
                client_id: &self.config.client_id,
                client_version: &self.config.client_version,
            },
            threat_info: ThreatInfo {
                threat_types: &self.config.threat_types,
                platform_types: &self.config.platform_types,
                threat_entry_types: ["URL"],
                threat_entries: [ThreatEntry { url }],
            },
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;
        let latency = started.elapsed();
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unexpected status").to_string());
            return Err(LookupError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: FindThreatMatchesResponse = response
            .json()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        Ok(LookupOutcome {
            status: status.as_u16(),
            latency,
            matches: parsed.matches.unwrap_or_default(),
        })
    }

    fn classify_transport_error(&self, err: reqwest::Error) -> LookupError {
        // The request URL carries the API key.
        let err = err.without_url();
        if err.is_timeout() {
            LookupError::Timeout {
                timeout_ms: self.config.timeout_ms,
                detail: error_chain(&err),
            }
        } else if err.is_decode() {
            LookupError::Malformed(error_chain(&err))
        } else {
            LookupError::Transport(error_chain(&err))
        }
    }
}
