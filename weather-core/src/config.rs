use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    env::VarError,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::debug;

/// Default location of the credential file, relative to the working directory.
pub const DEFAULT_CREDENTIAL_FILE: &str = ".apiConfig";

/// Default environment variable consulted when the credential file is absent.
pub const DEFAULT_CREDENTIAL_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// JSON key holding the API key inside the credential file.
pub const CREDENTIAL_FILE_KEY: &str = "OpenWeatherMapApiKey";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read credential file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse credential file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write credential file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("credential from {origin} is empty")]
    EmptyCredential { origin: String },

    #[error("environment variable {var} is not valid unicode")]
    InvalidEnv { var: String },

    #[error("no API credential configured (tried: {tried})")]
    Missing { tried: String },
}

/// API key presented to the upstream provider. Never printed by `Debug`.
pub struct Credential(SecretString);

impl Credential {
    /// Returns `None` for blank input; a blank key is never a usable credential.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(trimmed.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// One place a credential may come from.
///
/// `Ok(None)` means "not configured here, try the next source"; an error means the
/// source exists but is broken and the lookup must stop.
pub trait CredentialSource: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<Credential>, ConfigError>;

    /// Short human description, used when reporting that nothing was found.
    fn describe(&self) -> String;
}

/// On-disk shape of the credential file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialFile {
    #[serde(rename = "OpenWeatherMapApiKey")]
    pub api_key: String,
}

impl CredentialFile {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }

    /// Save the file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        fs::write(path, json).map_err(write_err)
    }
}

/// Reads `{"OpenWeatherMapApiKey": "..."}` from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for JsonFileSource {
    fn load(&self) -> Result<Option<Credential>, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential file not present");
                return Ok(None);
            }
            Err(source) => return Err(ConfigError::Read { path: self.path.clone(), source }),
        };

        let file: CredentialFile = serde_json::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: self.path.clone(), source })?;

        // An existing file is explicit configuration: blank keys fail rather than fall through.
        Credential::new(file.api_key)
            .map(Some)
            .ok_or_else(|| ConfigError::EmptyCredential { origin: self.describe() })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Result<String, VarError> + Send + Sync>;

/// Reads the credential from an environment variable; unset or blank counts as absent.
#[derive(Clone)]
pub struct EnvSource {
    var: String,
    lookup: EnvLookup,
}

impl EnvSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self::with_lookup(var, |name| std::env::var(name))
    }

    /// Resolve the variable through `lookup` instead of the process environment.
    pub fn with_lookup(
        var: impl Into<String>,
        lookup: impl Fn(&str) -> Result<String, VarError> + Send + Sync + 'static,
    ) -> Self {
        Self { var: var.into(), lookup: Arc::new(lookup) }
    }
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSource").field("var", &self.var).finish_non_exhaustive()
    }
}

impl CredentialSource for EnvSource {
    fn load(&self) -> Result<Option<Credential>, ConfigError> {
        match (self.lookup)(&self.var) {
            Ok(value) => Ok(Credential::new(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv { var: self.var.clone() }),
        }
    }

    fn describe(&self) -> String {
        format!("env {}", self.var)
    }
}

/// Ordered chain of credential sources. No built-in default key.
#[derive(Debug)]
pub struct CredentialProvider {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialProvider {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// File first, environment second.
    pub fn standard(file: impl Into<PathBuf>, env_var: impl Into<String>) -> Self {
        Self::new(vec![
            Box::new(JsonFileSource::new(file)),
            Box::new(EnvSource::new(env_var)),
        ])
    }

    pub fn load_credential(&self) -> Result<Credential, ConfigError> {
        for source in &self.sources {
            if let Some(credential) = source.load()? {
                debug!(source = %source.describe(), "loaded API credential");
                return Ok(credential);
            }
        }

        let tried = self.sources.iter().map(|s| s.describe()).collect::<Vec<_>>().join(", ");
        Err(ConfigError::Missing {
            tried: if tried.is_empty() { "no sources".to_string() } else { tried },
        })
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::standard(DEFAULT_CREDENTIAL_FILE, DEFAULT_CREDENTIAL_ENV)
    }
}
