//! Library root for the `phishwatch` crate
//! URL checking, the append-only check log, and the web front end over both.

// Core error handling
pub mod api_errors;
pub mod errors;

// Configuration & CLI
pub mod cli;
pub mod config;
pub mod logging;

// Check log
pub mod check_record;
pub mod log_store;
pub mod sanitize;

// Classification
pub mod classifier;
pub mod input_validator;
pub mod safe_browsing;
pub mod url_features;

// Web server interface
pub mod app_state;
pub mod csrf_protection;
pub mod views;
pub mod web;


pub use check_record::{CheckRecord, LogLevel};
pub use classifier::{keyword_check, Classifier, Method, Verdict};
pub use errors::{PhishError, PhishResult};
pub use log_store::{read_recent, LogWriter};
