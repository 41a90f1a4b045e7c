use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};
use weather_core::{
    config::{DEFAULT_CREDENTIAL_ENV, DEFAULT_CREDENTIAL_FILE},
    provider::openweather::DEFAULT_BASE_URL,
};

/// Process settings stored on disk. Every field is optional in the file.
///
/// Example TOML:
/// ```toml
/// port = 8080
/// credential_file = "/etc/weather-proxy/apiConfig.json"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind: IpAddr,
    pub port: u16,
    pub credential_file: PathBuf,
    pub credential_env: String,
    pub upstream_url: String,
    pub index_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            credential_env: DEFAULT_CREDENTIAL_ENV.to_string(),
            upstream_url: DEFAULT_BASE_URL.to_string(),
            index_file: PathBuf::from("index.html"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the platform config dir when `path` is `None`.
    ///
    /// A missing file at the default location yields defaults; an explicitly requested
    /// file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let default = Self::config_file_path()?;
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }

    /// Path to the settings file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather-proxy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.port, 8080);
        assert_eq!(s.credential_file, PathBuf::from(".apiConfig"));
        assert_eq!(s.credential_env, "OPENWEATHERMAP_API_KEY");
        assert!(s.upstream_url.starts_with("https://api.openweathermap.org"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = 9090\nindex_file = \"public/index.html\"\n").unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.port, 9090);
        assert_eq!(s.index_file, PathBuf::from("public/index.html"));
        assert_eq!(s.credential_file, PathBuf::from(".apiConfig"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }
}
