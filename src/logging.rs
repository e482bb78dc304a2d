use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "phishwatch=info,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Diagnostics go to stderr; the check log file is written separately by
/// [`crate::log_store::LogWriter`].
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // A second init (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
