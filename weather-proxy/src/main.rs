//! Binary crate for the `weather-proxy` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading process settings
//! - Serving enriched weather records over HTTP, with permissive CORS
//! - Interactive credential configuration

use clap::Parser;

mod cli;
mod cors;
mod server;
mod settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("weather_proxy=info,weather_core=info,tower_http=info")
    });

    if std::env::var("WEATHER_PROXY_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).with_writer(std::io::stderr).init();
    }
}
