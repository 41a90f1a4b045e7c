use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, model::WeatherRecord};

pub mod openweather;

/// Looks up current weather for a city and returns it fully enriched.
///
/// Every call is an independent upstream round trip: no caching, no retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, city: &str) -> Result<WeatherRecord>;
}

/// Cut an upstream body down to something fit for an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
