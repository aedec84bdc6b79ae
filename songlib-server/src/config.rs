//! Server configuration
//!
//! Loaded from a TOML file, then overridden by environment variables:
//!
//! | Variable                 | Setting                |
//! |--------------------------|------------------------|
//! | `APP_NAME`               | `app.name`             |
//! | `APP_VERSION`            | `app.version`          |
//! | `HTTP_HOST`              | `http.host`            |
//! | `HTTP_PORT`              | `http.port`            |
//! | `LOG_LEVEL`              | `log.level`            |
//! | `PG_POOL_MAX`            | `postgres.pool_max`    |
//! | `PG_URL`, `DATABASE_URL` | `postgres.url`         |
//! | `SONG_API_URL`           | `song_api.url`         |
//! | `SONG_API_TIMEOUT_SECS`  | `song_api.timeout_secs`|
//!
//! The file path is `--config`, else `CONFIG_PATH`, else `config/config.toml`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::DEFAULT_MAX_CONNECTIONS;

/// Config file used when neither `--config` nor `CONFIG_PATH` is set
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

const MASK: &str = "****";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "songlib".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub host: String,
    pub port: u16,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSection {
    pub pool_max: u32,
    pub url: String,
}

impl Default for PostgresSection {
    fn default() -> Self {
        Self {
            pool_max: DEFAULT_MAX_CONNECTIONS,
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongApiSection {
    /// Base URL; requests go to `<url>/info`
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SongApiSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppSection,
    pub http: HttpSection,
    pub log: LogSection,
    pub postgres: PostgresSection,
    pub song_api: SongApiSection,
}

impl Config {
    /// Config file path: explicit path, else `CONFIG_PATH`, else the default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("CONFIG_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load the config file and apply environment overrides.
    ///
    /// A missing file is an error only when `explicit` names it; otherwise
    /// defaults plus environment are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an
    /// environment override is not a valid value.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(explicit);

        let mut config = if explicit.is_none() && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        } else {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            Self::from_toml_str(&content)?
        };

        config.apply_env_with(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_NAME") {
            self.app.name = v;
        }
        if let Some(v) = lookup("APP_VERSION") {
            self.app.version = v;
        }
        if let Some(v) = lookup("HTTP_HOST") {
            self.http.host = v;
        }
        if let Some(v) = lookup("HTTP_PORT") {
            self.http.port = parse_env("HTTP_PORT", v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = lookup("PG_POOL_MAX") {
            self.postgres.pool_max = parse_env("PG_POOL_MAX", v)?;
        }
        if let Some(v) = lookup("PG_URL").or_else(|| lookup("DATABASE_URL")) {
            self.postgres.url = v;
        }
        if let Some(v) = lookup("SONG_API_URL") {
            self.song_api.url = v;
        }
        if let Some(v) = lookup("SONG_API_TIMEOUT_SECS") {
            self.song_api.timeout_secs = parse_env("SONG_API_TIMEOUT_SECS", v)?;
        }
        Ok(())
    }

    /// Check that the server can start with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.postgres.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "postgres.url",
            });
        }
        if self.song_api.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "song_api.url",
            });
        }
        Url::parse(&self.song_api.url).map_err(|e| ConfigError::Invalid {
            field: "song_api.url",
            reason: e.to_string(),
        })?;
        if self.postgres.pool_max == 0 {
            return Err(ConfigError::Invalid {
                field: "postgres.pool_max",
                reason: "must be at least 1".into(),
            });
        }
        if self.song_api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "song_api.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http.host, self.http.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "http.host",
                reason: e.to_string(),
            })
    }

    pub fn song_api_timeout(&self) -> Duration {
        Duration::from_secs(self.song_api.timeout_secs)
    }

    /// Copy with the database password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Ok(mut url) = Url::parse(&config.postgres.url) {
            if url.password().is_some() && url.set_password(Some(MASK)).is_ok() {
                config.postgres.url = url.to_string();
            }
        }
        config
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
