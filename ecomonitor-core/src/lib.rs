//! Core library for the EcoMonitor environmental data aggregator.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A time-bounded response cache and the fetcher built on it
//! - Normalization of heterogeneous upstream payloads into canonical records
//! - Clients for the upstream air-quality, bird and pollution APIs
//! - The personal environmental-impact estimator
//!
//! It is used by `ecomonitor-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod deforestation;
pub mod error;
pub mod fetch;
pub mod impact;
pub mod model;
pub mod news;
pub mod normalize;
pub mod provider;

pub use cache::{Clock, ResponseCache, SystemClock};
pub use config::{Config, ProviderConfig};
pub use error::Error;
pub use fetch::Fetcher;
pub use model::{AirQualityRecord, BirdReport, DeforestationReport, PollutionReport};
pub use provider::ProviderId;
