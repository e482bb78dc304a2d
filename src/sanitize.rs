//! URL reduction for logging.
//!
//! Only the scheme and host (plus an explicit non-default port) ever reach
//! the check log. Credentials, path, query and fragment are dropped.

use url::Url;

/// Placeholder for an absent or unparsable field.
pub const ABSENT: &str = "-";

/// Reduce `raw` to `scheme://host[:port]`.
///
/// Unparsable input sanitizes to `-`. Commas are percent-encoded so the
/// result is always a single field of the check log.
pub fn sanitize_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return ABSENT.to_string();
    };

    let mut out = format!("{}://", parsed.scheme());
    if let Some(host) = parsed.host_str() {
        out.push_str(host);
    }
    if let Some(port) = parsed.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.replace(',', "%2C")
}
