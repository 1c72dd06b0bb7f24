//! voxiq - VoxIQ terminal client
//!
//! Upload interview transcripts and recordings, track processing in
//! real time, browse AI-extracted themes and insights, and ask
//! natural-language questions against the data.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use voxiq_client::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    voxiq_client::cli::run(cli).await
}
