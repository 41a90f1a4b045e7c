use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};
use tracing::info;
use weather_core::{
    Credential, CredentialFile, CredentialProvider, OpenWeatherProvider, WeatherProvider,
};

use crate::{
    server::{self, AppState},
    settings::Settings,
};

/// Top-level CLI struct. Without a subcommand it behaves like `serve`.
#[derive(Debug, Parser)]
#[command(name = "weather-proxy", version, about = "Weather lookup proxy")]
pub struct Cli {
    /// Settings file; defaults to `config.toml` in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags of the `serve` command. Parsed on their own when no subcommand is given,
/// so `PORT` is only ever read on the serve path.
#[derive(Debug, Clone, Parser)]
pub struct ServeArgs {
    /// Port to listen on; overrides the settings file.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind; overrides the settings file.
    #[arg(long)]
    pub bind: Option<IpAddr>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /weather/{city}` over HTTP.
    Serve(ServeArgs),

    /// Look up one city and print the enriched record as JSON.
    Show {
        city: String,
    },

    /// Prompt for the API key and write the credential file.
    Configure {
        /// Where to write the file; defaults to the configured credential file.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = Settings::load(self.config.as_deref())?;

        let command = match self.command {
            Some(command) => command,
            None => Command::Serve(ServeArgs::try_parse_from(["weather-proxy"])?),
        };

        match command {
            Command::Serve(args) => {
                let addr = SocketAddr::new(
                    args.bind.unwrap_or(settings.bind),
                    args.port.unwrap_or(settings.port),
                );
                let state = AppState {
                    provider: Arc::new(build_provider(&settings)),
                    index_file: settings.index_file.clone(),
                };
                server::serve(state, addr).await
            }
            Command::Show { city } => {
                let record = build_provider(&settings).get_weather(&city).await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
            Command::Configure { path } => {
                let path = path.unwrap_or(settings.credential_file);
                let key = Password::new("OpenWeatherMap API key:")
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                if Credential::new(key.as_str()).is_none() {
                    bail!("API key must not be empty");
                }

                CredentialFile::new(key.trim()).save(&path)?;
                info!(path = %path.display(), "credential file written");
                println!("Saved API key to {}", path.display());
                Ok(())
            }
        }
    }
}

pub fn build_provider(settings: &Settings) -> OpenWeatherProvider {
    let credentials =
        CredentialProvider::standard(&settings.credential_file, settings.credential_env.as_str());
    OpenWeatherProvider::new(credentials).with_base_url(settings.upstream_url.as_str())
}
