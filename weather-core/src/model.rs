use chrono::DateTime;
use serde::Serialize;

use crate::error::{Result, WeatherError};

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Normalized, enriched weather for one city, as returned to callers.
///
/// Built only through [`WeatherRecord::from_observation`], so the derived Celsius
/// and wall-clock strings always agree with the raw values beside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub location_name: String,
    pub temperature: Temperature,
    pub coordinates: Coordinates,
    pub conditions: Vec<Condition>,
    pub wind: Wind,
    pub sun: Sun,
    pub utc_offset_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    pub kelvin: f64,
    pub celsius: String,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wind {
    pub speed_meters_per_second: f64,
    pub direction_degrees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sun {
    pub country_code: String,
    pub sunrise_epoch_seconds: i64,
    pub sunrise_local: String,
    pub sunset_epoch_seconds: i64,
    pub sunset_local: String,
}

/// Provider-neutral raw observation, before any derived field is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location_name: String,
    pub kelvin: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub conditions: Vec<String>,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub country_code: String,
    pub sunrise: i64,
    pub sunset: i64,
    pub utc_offset_seconds: i64,
}

impl WeatherRecord {
    /// Derive Celsius and local sunrise/sunset, failing as a whole if any piece can't be computed.
    pub fn from_observation(obs: Observation) -> Result<Self> {
        let sunrise_local = local_clock_time(obs.sunrise, obs.utc_offset_seconds)
            .ok_or(WeatherError::InvalidTimestamp { field: "sunrise", value: obs.sunrise })?;
        let sunset_local = local_clock_time(obs.sunset, obs.utc_offset_seconds)
            .ok_or(WeatherError::InvalidTimestamp { field: "sunset", value: obs.sunset })?;

        Ok(Self {
            location_name: obs.location_name,
            temperature: Temperature {
                kelvin: obs.kelvin,
                celsius: celsius_from_kelvin(obs.kelvin),
                pressure: obs.pressure,
                humidity: obs.humidity,
            },
            coordinates: Coordinates { latitude: obs.latitude, longitude: obs.longitude },
            conditions: obs
                .conditions
                .into_iter()
                .map(|description| Condition { description })
                .collect(),
            wind: Wind {
                speed_meters_per_second: obs.wind_speed,
                direction_degrees: obs.wind_direction,
            },
            sun: Sun {
                country_code: obs.country_code,
                sunrise_epoch_seconds: obs.sunrise,
                sunrise_local,
                sunset_epoch_seconds: obs.sunset,
                sunset_local,
            },
            utc_offset_seconds: obs.utc_offset_seconds,
        })
    }
}

/// Kelvin to Celsius, fixed-point with exactly two decimals and `.` as separator.
pub fn celsius_from_kelvin(kelvin: f64) -> String {
    format!("{:.2}", kelvin - KELVIN_OFFSET)
}

/// Wall-clock time at the location, e.g. `06:04 PM`.
///
/// The UTC offset is applied before formatting, so the result is the location's
/// local time regardless of where this process runs. `None` if out of range.
pub fn local_clock_time(epoch_seconds: i64, utc_offset_seconds: i64) -> Option<String> {
    let shifted = epoch_seconds.checked_add(utc_offset_seconds)?;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.format("%I:%M %p").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> Observation {
        Observation {
            location_name: "London".into(),
            kelvin: 300.0,
            pressure: 1012,
            humidity: 81,
            latitude: 51.5085,
            longitude: -0.1257,
            conditions: vec!["light rain".into(), "mist".into()],
            wind_speed: 4.12,
            wind_direction: 250.0,
            country_code: "GB".into(),
            sunrise: 1_700_000_000,
            sunset: 1_700_030_000,
            utc_offset_seconds: 0,
        }
    }

    #[test]
    fn celsius_has_two_decimals() {
        assert_eq!(celsius_from_kelvin(300.0), "26.85");
        assert_eq!(celsius_from_kelvin(273.15), "0.00");
        assert_eq!(celsius_from_kelvin(250.0), "-23.15");
        assert_eq!(celsius_from_kelvin(1000.0), "726.85");
    }

    #[test]
    fn clock_time_is_twelve_hour_zero_padded() {
        assert_eq!(local_clock_time(0, 0).as_deref(), Some("12:00 AM"));
        // 2023-11-14T22:13:20Z
        assert_eq!(local_clock_time(1_700_000_000, 0).as_deref(), Some("10:13 PM"));
        // 2023-11-14T06:04:00Z
        assert_eq!(local_clock_time(1_699_941_840, 0).as_deref(), Some("06:04 AM"));
    }

    #[test]
    fn clock_time_applies_location_offset() {
        assert_eq!(local_clock_time(1_700_000_000, 3_600).as_deref(), Some("11:13 PM"));
        assert_eq!(local_clock_time(1_700_000_000, -18_000).as_deref(), Some("05:13 PM"));
        // Crossing midnight into the next day.
        assert_eq!(local_clock_time(1_700_000_000, 7_200).as_deref(), Some("12:13 AM"));
    }

    #[test]
    fn clock_time_is_deterministic() {
        let first = local_clock_time(1_699_941_840, 19_800);
        for _ in 0..5 {
            assert_eq!(local_clock_time(1_699_941_840, 19_800), first);
        }
    }

    #[test]
    fn clock_time_rejects_out_of_range() {
        assert!(local_clock_time(i64::MAX, 1).is_none());
        assert!(local_clock_time(i64::MAX / 2, 0).is_none());
    }

    #[test]
    fn record_derives_all_fields_together() {
        let record = WeatherRecord::from_observation(observation()).unwrap();

        assert_eq!(record.temperature.celsius, "26.85");
        assert_eq!(record.sun.sunrise_local, "10:13 PM");
        // 1_700_030_000 = 2023-11-15T06:33:20Z
        assert_eq!(record.sun.sunset_local, "06:33 AM");
        assert_eq!(record.conditions.len(), 2);
        assert_eq!(record.conditions[1].description, "mist");
    }

    #[test]
    fn record_with_bad_sunset_fails_whole() {
        let mut obs = observation();
        obs.sunset = i64::MAX;

        let err = WeatherRecord::from_observation(obs).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidTimestamp { field: "sunset", .. }));
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let mut obs = observation();
        obs.conditions.clear();
        let record = WeatherRecord::from_observation(obs).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["locationName"], "London");
        assert_eq!(json["temperature"]["celsius"], "26.85");
        assert_eq!(json["temperature"]["kelvin"], 300.0);
        assert_eq!(json["coordinates"]["longitude"], -0.1257);
        assert_eq!(json["wind"]["speedMetersPerSecond"], 4.12);
        assert_eq!(json["sun"]["sunriseEpochSeconds"], 1_700_000_000);
        assert_eq!(json["sun"]["countryCode"], "GB");
        assert_eq!(json["utcOffsetSeconds"], 0);
        assert!(json["conditions"].as_array().unwrap().is_empty());
    }
}
