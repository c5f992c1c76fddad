use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub uploads: UploadSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CacheSettings {
    /// Redis L2 cache; the service runs with L1 only when unset or unreachable
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_issuer() -> String { "tripmate".to_string() }
fn default_session_ttl() -> u64 { 86_400 }
fn default_bcrypt_cost() -> u32 { bcrypt::DEFAULT_COST }

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            public_prefix: default_public_prefix(),
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_upload_dir() -> String { "static/uploads".to_string() }
fn default_public_prefix() -> String { "/static/uploads".to_string() }
fn default_max_upload_bytes() -> usize { crate::services::DEFAULT_MAX_UPLOAD_BYTES }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_count")]
    pub default_count: usize,
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            max_count: default_max_count(),
        }
    }
}

fn default_count() -> usize { 1 }
fn default_max_count() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Prefix of structured overrides, e.g. `TRIPMATE__SERVER__PORT` -> `server.port`
const ENV_PREFIX: &str = "TRIPMATE";

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load `config/default.toml`, then `config/local.toml`, then
    /// `TRIPMATE__*` variables, then the `DATABASE_URL` and
    /// `TRIPMATE_SESSION_SECRET` shorthands. Later sources win.
    pub fn load() -> Result<Self, ConfigError> {
        let layered = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?;

        let settings: Settings = apply_env_shorthands(layered)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a single config file plus `TRIPMATE__*` overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Message("session.secret must not be empty".to_string()));
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Message(
                "database.url is required when database.backend = \"postgres\"".to_string(),
            ));
        }
        if self.matching.max_count == 0 || self.matching.default_count > self.matching.max_count {
            return Err(ConfigError::Message(format!(
                "matching.default_count ({}) must be within 1..=matching.max_count ({})",
                self.matching.default_count, self.matching.max_count
            )));
        }
        if !(4..=31).contains(&self.session.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "session.bcrypt_cost must be between 4 and 31, got {}",
                self.session.bcrypt_cost
            )));
        }
        Ok(())
    }
}

fn apply_env_shorthands(layered: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(layered);

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(secret) = std::env::var("TRIPMATE_SESSION_SECRET") {
        builder = builder.set_override("session.secret", secret)?;
    }

    builder.build()
}
