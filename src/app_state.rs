use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    classifier::Classifier,
    config::AppConfig,
    csrf_protection::CsrfProtection,
    errors::PhishResult,
    log_store::LogWriter,
};

/// Shared state behind every request handler.
pub struct AppState {
    pub classifier: Classifier,
    pub csrf: CsrfProtection,
    pub log_path: PathBuf,
    pub dashboard_limit: usize,
}

impl AppState {
    pub fn new(classifier: Classifier, csrf: CsrfProtection, dashboard_limit: usize) -> Self {
        let log_path = classifier.log_writer().path().to_path_buf();
        Self {
            classifier,
            csrf,
            log_path,
            dashboard_limit,
        }
    }

    pub fn from_config(config: &AppConfig) -> PhishResult<Self> {
        let log = Arc::new(LogWriter::new(config.log_path.clone()));
        let classifier = Classifier::new(config, log)?;
        let csrf = CsrfProtection::from_optional_secret(
            config.secret_key.as_deref(),
            config.csrf_token_lifetime_secs,
        );
        tracing::info!(
            log_path = %config.log_path.display(),
            remote_enabled = config.google_api_key.is_some(),
            "application state ready"
        );
        Ok(Self::new(classifier, csrf, config.dashboard_limit))
    }
}
