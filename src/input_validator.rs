use crate::classifier::Method;
use crate::errors::{PhishError, PhishResult};

pub const MAX_URL_LEN: usize = 2048;
pub const EMPTY_URL_MESSAGE: &str = "Please enter a valid URL.";
pub const URL_TOO_LONG_MESSAGE: &str = "The URL is too long to check.";

/// A submission that passed validation and may be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSubmission {
    pub url: String,
    pub method: Method,
}

/// Validate raw form input. The URL is trimmed; blank input and unknown
/// method tokens are rejected as validation errors.
pub fn validate_submission(url: &str, method: &str) -> PhishResult<CheckSubmission> {
    let url = url.trim();
    if url.is_empty() {
        return Err(PhishError::validation("url", EMPTY_URL_MESSAGE));
    }
    if url.len() > MAX_URL_LEN {
        return Err(PhishError::validation("url", URL_TOO_LONG_MESSAGE));
    }

    let method: Method = method.parse()?;

    Ok(CheckSubmission {
        url: url.to_string(),
        method,
    })
}
