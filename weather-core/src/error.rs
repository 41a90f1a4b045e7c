use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Everything that can fail while answering a single weather lookup.
///
/// None of these are fatal to the process; the caller decides how to surface them.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The provider could not be reached, or the connection broke mid-response.
    #[error("weather provider unavailable: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    /// The provider answered, but with a non-success status (unknown city, bad key...).
    #[error("weather provider returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("failed to decode weather provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather provider sent an out-of-range {field} timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: i64 },
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
