//! Backend configuration parsed from environment variables.
//!
//! Read once at startup. There is no runtime reconfiguration; building a new
//! [`crate::app::App`] is the only way to point at a different backend.

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_ENDPOINT: &str = "APPWRITE_URL";
pub const ENV_PROJECT_ID: &str = "APPWRITE_PROJECT_ID";
pub const ENV_DATABASE_ID: &str = "APPWRITE_DATABASE_ID";
pub const ENV_COLLECTION_ID: &str = "APPWRITE_COLLECTION_ID";
pub const ENV_BUCKET_ID: &str = "APPWRITE_BUCKET_ID";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "APPWRITE_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "APPWRITE_CONNECT_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set or empty.
    #[error("missing configuration: env var {var} not set")]
    MissingVar { var: &'static str },

    /// A variable is set but its value is unusable.
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Where the backend lives and which project resources hold blog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// API base URL including the version segment, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
    pub timeouts: Timeouts,
}

impl BackendConfig {
    /// Build typed config from the process environment.
    ///
    /// Required: `APPWRITE_URL`, `APPWRITE_PROJECT_ID`, `APPWRITE_DATABASE_ID`,
    /// `APPWRITE_COLLECTION_ID`, `APPWRITE_BUCKET_ID`.
    ///
    /// Optional: `APPWRITE_REQUEST_TIMEOUT_SECS` (default 30),
    /// `APPWRITE_CONNECT_TIMEOUT_SECS` (default 10).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`BackendConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = parse_endpoint(&required(&lookup, ENV_ENDPOINT)?)?;
        let project_id = required(&lookup, ENV_PROJECT_ID)?;
        let database_id = required(&lookup, ENV_DATABASE_ID)?;
        let collection_id = required(&lookup, ENV_COLLECTION_ID)?;
        let bucket_id = required(&lookup, ENV_BUCKET_ID)?;
        let timeouts = Timeouts {
            request_secs: optional_secs(&lookup, ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: optional_secs(&lookup, ENV_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { endpoint, project_id, database_id, collection_id, bucket_id, timeouts })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar { var })
}

fn optional_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).map(|v| v.trim().to_owned()) {
        None => Ok(default),
        Some(raw) if raw.is_empty() => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => Err(ConfigError::Invalid { var, message: "must be greater than zero".into() }),
            Ok(secs) => Ok(secs),
            Err(e) => Err(ConfigError::Invalid { var, message: format!("{raw}: {e}") }),
        },
    }
}

fn parse_endpoint(raw: &str) -> Result<String, ConfigError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: ENV_ENDPOINT,
            message: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
