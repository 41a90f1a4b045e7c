//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Credential loading from pluggable sources (file, environment)
//! - The upstream weather provider abstraction and its OpenWeatherMap client
//! - The enriched `WeatherRecord` returned to callers, and its derived fields
//!
//! It is used by `weather-proxy`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{ConfigError, Credential, CredentialFile, CredentialProvider, CredentialSource};
pub use error::WeatherError;
pub use model::WeatherRecord;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
