// Runtime configuration for phishwatch
// Loaded once at start-up and handed to the classifier, log store and web layer.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "phishwatch.toml";
const REDACTED: &str = "***";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeBrowsingConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    pub client_id: String,
    pub client_version: String,
    pub threat_types: Vec<String>,
    pub platform_types: Vec<String>,
}

impl Default for SafeBrowsingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://safebrowsing.googleapis.com/v4/threatMatches:find".to_string(),
            timeout_ms: 5000,
            client_id: "phishing-detector".to_string(),
            client_version: "1.0".to_string(),
            threat_types: vec![
                "MALWARE".to_string(),
                "SOCIAL_ENGINEERING".to_string(),
                "UNWANTED_SOFTWARE".to_string(),
            ],
            platform_types: vec!["ANY_PLATFORM".to_string()],
        }
    }
}

impl SafeBrowsingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_path: PathBuf,
    pub dashboard_limit: usize,
    /// Also record keyword checks in the check log.
    #[serde(default)]
    pub log_keyword_checks: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    pub csrf_token_lifetime_secs: u64,
    #[serde(default)]
    pub safe_browsing: SafeBrowsingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            log_path: PathBuf::from("api_monitor.log"),
            dashboard_limit: 100,
            log_keyword_checks: false,
            google_api_key: None,
            secret_key: None,
            csrf_token_lifetime_secs: 3600,
            safe_browsing: SafeBrowsingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Copy of the configuration with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        cfg.google_api_key = cfg.google_api_key.map(|_| REDACTED.to_string());
        cfg.secret_key = cfg.secret_key.map(|_| REDACTED.to_string());
        cfg
    }

    fn normalize(mut self) -> Self {
        self.google_api_key = non_blank(self.google_api_key);
        self.secret_key = non_blank(self.secret_key);
        self
    }

    fn validate(&self) -> Result<(), figment::Error> {
        if self.dashboard_limit == 0 {
            return Err(figment::Error::from("dashboard_limit must be greater than 0".to_string()));
        }
        if self.safe_browsing.timeout_ms == 0 {
            return Err(figment::Error::from(
                "safe_browsing.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(figment::Error::from("log_path cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pick the TOML file to read: an explicit path, `./phishwatch.toml`, or the
/// per-user config directory.
fn resolve_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, figment::Error> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(figment::Error::from(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("phishwatch").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file()))
}

/// Load configuration: defaults, then TOML, then `PHISHWATCH_*` variables,
/// then the bare `GOOGLE_API_KEY` / `SECRET_KEY` variables.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, figment::Error> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = resolve_config_file(explicit)? {
        figment = figment.merge(Toml::file(path));
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("PHISHWATCH_").split("__"))
        .merge(Env::raw().only(&["GOOGLE_API_KEY", "SECRET_KEY"]))
        .extract()?;

    let config = config.normalize();
    config.validate()?;
    Ok(config)
}
