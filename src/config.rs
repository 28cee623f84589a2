//! Server configuration, sourced from `REGISTRY_*` environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `REGISTRY_HOST` | `0.0.0.0` |
//! | `REGISTRY_PORT` | `8080` |
//! | `REGISTRY_BACKEND` | `volatile` (or `durable`) |
//! | `REGISTRY_DB_PATH` | `accounts.db` |
//! | `REGISTRY_CALL_TIMEOUT_MS` | `1000` |
//! | `REGISTRY_SEED_CSV` | unset |
//! | `REGISTRY_SNAPSHOT_CSV` | unset |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::BootstrapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Volatile,
    Durable,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "volatile" => Ok(BackendKind::Volatile),
            "durable" => Ok(BackendKind::Durable),
            _ => Err("expected `volatile` or `durable`".to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub db_path: PathBuf,
    pub call_timeout: Duration,
    /// Accounts to create at startup.
    pub seed_csv: Option<PathBuf>,
    /// Where to write every account on shutdown.
    pub snapshot_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            backend: BackendKind::Volatile,
            db_path: PathBuf::from("accounts.db"),
            call_timeout: Duration::from_millis(1000),
            seed_csv: None,
            snapshot_csv: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source, falling back to
    /// defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BootstrapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let timeout_ms: u64 = parse(&lookup, "REGISTRY_CALL_TIMEOUT_MS")?
            .unwrap_or(defaults.call_timeout.as_millis() as u64);
        if timeout_ms == 0 {
            return Err(BootstrapError::Config {
                key: "REGISTRY_CALL_TIMEOUT_MS",
                value: "0".to_owned(),
                reason: "must be positive".to_owned(),
            });
        }

        Ok(Self {
            host: lookup("REGISTRY_HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "REGISTRY_PORT")?.unwrap_or(defaults.port),
            backend: parse(&lookup, "REGISTRY_BACKEND")?.unwrap_or(defaults.backend),
            db_path: lookup("REGISTRY_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            call_timeout: Duration::from_millis(timeout_ms),
            seed_csv: lookup("REGISTRY_SEED_CSV").map(PathBuf::from),
            snapshot_csv: lookup("REGISTRY_SNAPSHOT_CSV").map(PathBuf::from),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, BootstrapError>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| BootstrapError::Config {
                key,
                reason: err.to_string(),
                value,
            }),
    }
}
