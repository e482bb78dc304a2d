use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    app_state::AppState,
    check_record::CheckRecord,
    classifier::{Classifier, Method},
    config::{load_config, AppConfig},
    input_validator::validate_submission,
    log_store::{read_recent, LogWriter},
    url_features::extract_features,
    web::build_router,
};

/// Top-level CLI interface for phishwatch
#[derive(Parser)]
#[command(
    name = "phishwatch",
    version,
    about = "Check URLs for phishing and review the check log"
)]
pub struct Cli {
    /// TOML configuration file (default: ./phishwatch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the web form, dashboard and JSON API
    Serve {
        /// Host/IP to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check a single URL
    Check {
        url: String,
        /// `dummy` (keyword matching) or `google` (Safe Browsing)
        #[arg(short, long, default_value = "dummy")]
        method: String,
    },

    /// Print the most recent check log records
    Dashboard {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print lexical features of a URL as JSON
    Features { url: String },

    /// Print the effective configuration (secrets masked)
    Config,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Check { url, method } => check(&config, &url, &method).await,
        Commands::Dashboard { limit } => {
            let limit = limit.unwrap_or(config.dashboard_limit);
            print!("{}", format_table(&read_recent(&config.log_path, limit)));
            Ok(())
        }
        Commands::Features { url } => {
            let features = extract_features(&url);
            println!("{}", serde_json::to_string_pretty(&features)?);
            Ok(())
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config.redacted())?);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(h) = host {
        config.host = h;
    }
    if let Some(p) = port {
        config.port = p;
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn check(config: &AppConfig, url: &str, method: &str) -> anyhow::Result<()> {
    let submission = validate_submission(url, method)?;
    let log = Arc::new(LogWriter::new(config.log_path.clone()));
    let classifier = Classifier::new(config, log)?;

    let verdict = classifier.classify(&submission.url, submission.method).await?;
    let source = match submission.method {
        Method::Keyword => "keyword match",
        Method::Remote => "Safe Browsing",
    };
    println!("{} ({source})", verdict.label());
    Ok(())
}

/// Render records as left-aligned columns.
pub fn format_table(records: &[CheckRecord]) -> String {
    let header = ["TIME", "LEVEL", "URL", "STATUS", "RESULT"];
    let rows: Vec<[&str; 5]> = records
        .iter()
        .map(|r| {
            [
                r.timestamp.as_str(),
                r.level.as_str(),
                r.sanitized_url.as_str(),
                r.status.as_str(),
                r.result.as_str(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_row = |cells: &[&str; 5]| {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i + 1 == cells.len() {
                line.push_str(cell);
            } else {
                line.push_str(cell);
                line.push_str(&" ".repeat(widths[i] - cell.chars().count() + 2));
            }
        }
        line.push('\n');
        line
    };

    let mut out = fmt_row(&header);
    for row in &rows {
        out.push_str(&fmt_row(row));
    }
    out
}
