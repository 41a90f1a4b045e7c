use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::CredentialProvider,
    error::{Result, WeatherError},
    model::{Observation, WeatherRecord},
};

use super::{WeatherProvider, truncate_body};

/// Current-weather endpoint of OpenWeatherMap.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug)]
pub struct OpenWeatherProvider {
    credentials: CredentialProvider,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(credentials: CredentialProvider) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point at a different endpoint, e.g. a regional mirror or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<OwCurrentResponse> {
        // Credential before any network activity.
        let credential = self.credentials.load_credential()?;

        debug!(url = %self.base_url, city, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", credential.expose())])
            .send()
            .await
            .map_err(|e| WeatherError::UpstreamUnavailable(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::UpstreamUnavailable(e.without_url()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| truncate_body(&body));
            warn!(%status, city, %message, "weather provider rejected request");
            return Err(WeatherError::Upstream { status, message });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, city: &str) -> Result<WeatherRecord> {
        let parsed = self.fetch_current(city).await?;
        WeatherRecord::from_observation(parsed.into())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: i64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    coord: OwCoord,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    timezone: i64,
}

/// Error body, e.g. `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    message: Option<String>,
}

impl From<OwCurrentResponse> for Observation {
    fn from(r: OwCurrentResponse) -> Self {
        Observation {
            location_name: r.name,
            kelvin: r.main.temp,
            pressure: r.main.pressure,
            humidity: r.main.humidity,
            latitude: r.coord.lat,
            longitude: r.coord.lon,
            conditions: r.weather.into_iter().map(|w| w.description).collect(),
            wind_speed: r.wind.speed,
            wind_direction: r.wind.deg,
            country_code: r.sys.country,
            sunrise: r.sys.sunrise,
            sunset: r.sys.sunset,
            utc_offset_seconds: r.timezone,
        }
    }
}
