use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use ecomonitor_core::cache::ResponseCache;
use ecomonitor_core::config::Config;
use ecomonitor_core::fetch::Fetcher;
use ecomonitor_core::impact::{ImpactProfile, estimate};
use ecomonitor_core::provider::aqicn::{AqiQuery, AqicnProvider};
use ecomonitor_core::provider::ebird::EbirdProvider;
use ecomonitor_core::provider::openaq::OpenaqProvider;
use ecomonitor_core::provider::ProviderId;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "ecomonitor", version, about = "Environmental data aggregator CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "aqicn", "ebird" or "openaq".
        provider: String,
    },

    /// Air quality for a city or a coordinate pair.
    Aqi {
        /// City name, used when no coordinates are given.
        #[arg(long, default_value = "beijing")]
        city: String,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },

    /// Recent bird observations for a region.
    Birds {
        /// eBird region code.
        #[arg(long, default_value = "US-NY-063")]
        region: String,
    },

    /// Birding hotspots around a coordinate pair.
    Hotspots {
        #[arg(long, default_value_t = 40.7128, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, default_value_t = -74.0060, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Latest pollution measurements for a country.
    Pollution {
        /// ISO country code.
        #[arg(long, default_value = "USA")]
        country: String,
    },

    /// Estimate an environmental footprint from a lifestyle profile.
    Impact {
        /// JSON profile file; reads stdin when omitted.
        profile: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),

            Command::Aqi { city, lat, lng } => {
                let query = match (lat, lng) {
                    (Some(lat), Some(lng)) => AqiQuery::Geo { lat, lng },
                    _ => AqiQuery::City(city),
                };
                let provider = AqicnProvider::from_config(&Config::load()?, fetcher()?)?;
                print_or_error(provider.air_quality(&query).await)
            }

            Command::Birds { region } => {
                let provider = EbirdProvider::from_config(&Config::load()?, fetcher()?)?;
                print_or_error(provider.recent_observations(&region).await)
            }

            Command::Hotspots { lat, lng } => {
                let provider = EbirdProvider::from_config(&Config::load()?, fetcher()?)?;
                print_or_error(provider.hotspots(lat, lng).await)
            }

            Command::Pollution { country } => {
                let provider = OpenaqProvider::from_config(&Config::load()?, fetcher()?);
                print_or_error(provider.latest(&country).await)
            }

            Command::Impact { profile } => {
                let raw = read_profile(profile)?;
                let profile: ImpactProfile = serde_json::from_str(&raw)
                    .context("Failed to parse impact profile JSON")?;
                print_json(&estimate(&profile))
            }
        }
    }
}

fn fetcher() -> anyhow::Result<Arc<Fetcher>> {
    Ok(Arc::new(Fetcher::new(ResponseCache::new())?))
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved credentials for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}

fn read_profile(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile file: {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read profile from stdin")?;
            Ok(raw)
        }
    }
}

/// Print the canonical JSON, or mirror the service error contract: the
/// structured error payload on stderr and a non-zero exit.
fn print_or_error<T: Serialize>(result: Result<T, ecomonitor_core::Error>) -> anyhow::Result<()> {
    match result {
        Ok(value) => print_json(&value),
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err.payload())?);
            Err(err.into())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
