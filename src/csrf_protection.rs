//! CSRF protection for the check form
//!
//! Tokens are stateless: `<issued_unix>.<nonce>.<mac>`, where the MAC is
//! HMAC-SHA256 over `<issued_unix>.<nonce>` keyed by the session secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub struct CsrfProtection {
    secret: Vec<u8>,
    token_lifetime: Duration,
}

impl CsrfProtection {
    pub fn new(secret: impl AsRef<[u8]>, token_lifetime_seconds: u64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            token_lifetime: Duration::from_secs(token_lifetime_seconds),
        }
    }

    /// Use the configured secret, or a random one that lives as long as the
    /// process when none is configured.
    pub fn from_optional_secret(secret: Option<&str>, token_lifetime_seconds: u64) -> Self {
        match secret {
            Some(s) => Self::new(s, token_lifetime_seconds),
            None => {
                tracing::warn!(
                    "SECRET_KEY is not set; form tokens will not survive a restart"
                );
                let ephemeral = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
                Self::new(ephemeral, token_lifetime_seconds)
            }
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    pub fn generate_token(&self) -> String {
        self.token_issued_at(Utc::now().timestamp())
    }

    fn token_issued_at(&self, issued: i64) -> String {
        let payload = format!("{issued}.{}", Uuid::new_v4().simple());
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{payload}.{sig}")
    }

    pub fn validate_token(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now().timestamp())
    }

    fn validate_at(&self, token: &str, now: i64) -> bool {
        let Some((payload, sig)) = token.rsplit_once('.') else {
            return false;
        };
        let Some((issued, _nonce)) = payload.split_once('.') else {
            return false;
        };
        let Ok(issued) = issued.parse::<i64>() else {
            return false;
        };
        let Ok(sig) = URL_SAFE_NO_PAD.decode(sig) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        if mac.verify_slice(&sig).is_err() {
            return false;
        }

        let age = now - issued;
        age >= 0 && (age as u64) <= self.token_lifetime.as_secs()
    }
}
