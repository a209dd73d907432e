//! Process configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `STOCKROOM_DATA_FILE` | `{data_dir}/stockroom/store.json` |
//! | `STOCKROOM_USERNAME` | `admin` |
//! | `STOCKROOM_PASSWORD` | `admin123` |
//! | `STOCKROOM_LOG_FORMAT` | `pretty` |

use std::path::PathBuf;

use thiserror::Error;

use stockroom_auth::CredentialPolicy;
use stockroom_observability::{LogFormat, ParseLogFormatError};

pub const ENV_DATA_FILE: &str = "STOCKROOM_DATA_FILE";
pub const ENV_USERNAME: &str = "STOCKROOM_USERNAME";
pub const ENV_PASSWORD: &str = "STOCKROOM_PASSWORD";
pub const ENV_LOG_FORMAT: &str = "STOCKROOM_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve a data directory; set STOCKROOM_DATA_FILE")]
    NoDataDir,

    #[error("STOCKROOM_USERNAME and STOCKROOM_PASSWORD must be set together")]
    PartialCredentials,

    #[error("STOCKROOM_USERNAME must not be empty")]
    EmptyUsername,

    #[error(transparent)]
    LogFormat(#[from] ParseLogFormatError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub credentials: CredentialPolicy,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), default_data_file)
    }

    /// Build from an arbitrary variable source; `default_file` is consulted
    /// only when no data file is configured.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        default_file: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let data_file = match non_empty(lookup(ENV_DATA_FILE)) {
            Some(path) => PathBuf::from(path),
            None => default_file().ok_or(ConfigError::NoDataDir)?,
        };

        let credentials = match (lookup(ENV_USERNAME), lookup(ENV_PASSWORD)) {
            (None, None) => CredentialPolicy::default(),
            (Some(user), Some(_)) if user.trim().is_empty() => {
                return Err(ConfigError::EmptyUsername);
            }
            (Some(user), Some(password)) => CredentialPolicy::new(user, password),
            _ => return Err(ConfigError::PartialCredentials),
        };

        let log_format = match non_empty(lookup(ENV_LOG_FORMAT)) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            data_file,
            credentials,
            log_format,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `{app_data_dir}/stockroom/store.json`, falling back to
/// `~/.local/share` when the platform has no data dir.
pub fn default_data_file() -> Option<PathBuf> {
    let base = dirs::data_dir().or_else(|| {
        dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        })
    })?;
    Some(base.join("stockroom").join("store.json"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(
            |key| vars.get(key).cloned(),
            || Some(PathBuf::from("/data/stockroom/store.json")),
        )
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.data_file, PathBuf::from("/data/stockroom/store.json"));
        assert!(cfg.credentials.is_default());
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn explicit_values_win() {
        let cfg = config(&[
            (ENV_DATA_FILE, "/tmp/inv.json"),
            (ENV_USERNAME, "ops"),
            (ENV_PASSWORD, "pw"),
            (ENV_LOG_FORMAT, "json"),
        ])
        .unwrap();

        assert_eq!(cfg.data_file, PathBuf::from("/tmp/inv.json"));
        assert!(cfg.credentials.accepts("ops", "pw"));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_data_file_falls_back_to_default() {
        let cfg = config(&[(ENV_DATA_FILE, "  ")]).unwrap();
        assert_eq!(cfg.data_file, PathBuf::from("/data/stockroom/store.json"));
    }

    #[test]
    fn half_set_credentials_are_rejected() {
        assert!(matches!(
            config(&[(ENV_USERNAME, "ops")]),
            Err(ConfigError::PartialCredentials)
        ));
        assert!(matches!(
            config(&[(ENV_PASSWORD, "pw")]),
            Err(ConfigError::PartialCredentials)
        ));
        assert!(matches!(
            config(&[(ENV_USERNAME, " "), (ENV_PASSWORD, "pw")]),
            Err(ConfigError::EmptyUsername)
        ));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        assert!(matches!(
            config(&[(ENV_LOG_FORMAT, "xml")]),
            Err(ConfigError::LogFormat(_))
        ));
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let err = Config::from_lookup(|_| None, || None).unwrap_err();
        assert!(matches!(err, ConfigError::NoDataDir));
    }
}
