use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::StoreTables;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Which store implementation serves the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Supabase,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default)]
    pub tables: TableSettings,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            tables: TableSettings::default(),
        }
    }
}

fn default_backend() -> Backend { Backend::Supabase }

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_matches_table")]
    pub matches: String,
    #[serde(default = "default_profiles_table")]
    pub user_profiles: String,
    #[serde(default = "default_preferences_table")]
    pub user_preferences: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            matches: default_matches_table(),
            user_profiles: default_profiles_table(),
            user_preferences: default_preferences_table(),
        }
    }
}

impl From<TableSettings> for StoreTables {
    fn from(tables: TableSettings) -> Self {
        StoreTables {
            matches: tables.matches,
            user_profiles: tables.user_profiles,
            user_preferences: tables.user_preferences,
        }
    }
}

fn default_matches_table() -> String { "matches".to_string() }
fn default_profiles_table() -> String { "user_profiles".to_string() }
fn default_preferences_table() -> String { "user_preferences".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
}

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

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with STYLESWIPE_)
    /// 4. Conventional Supabase variables (SUPABASE_URL, DATABASE_URL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., STYLESWIPE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STYLESWIPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the selected backend has what it needs to connect
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.store.backend {
            Backend::Supabase => {
                if self.supabase.url.trim().is_empty() {
                    return Err(ConfigError::Message("supabase.url is required".into()));
                }
                if self.supabase.api_key.trim().is_empty() {
                    return Err(ConfigError::Message("supabase.api_key is required".into()));
                }
            }
            Backend::Postgres => {
                if self.database.url.trim().is_empty() {
                    return Err(ConfigError::Message("database.url is required".into()));
                }
            }
            Backend::Memory => {}
        }
        Ok(())
    }
}

/// Apply the environment variables Supabase tooling conventionally sets
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("SUPABASE_URL", "supabase.url"),
        ("SUPABASE_SERVICE_ROLE_KEY", "supabase.api_key"),
        ("DATABASE_URL", "database.url"),
        ("SUPABASE_JWT_SECRET", "auth.jwt_secret"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
