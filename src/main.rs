// phishwatch - main.rs
// Loads .env, installs tracing and hands off to the CLI.

use clap::Parser;
use phishwatch::cli::{run, Cli};
use phishwatch::logging::{init_tracing, DEFAULT_FILTER};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_FILTER);

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}
