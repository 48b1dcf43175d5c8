//! TOML-based configuration for the house service
//!
//! Loaded once at startup from `house.toml` (or the path given on the command
//! line) and immutable afterwards. Secrets are never stored in the file: the
//! file names environment variables and the values are read from there.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;

use crate::db::DatabaseProvider;

/// Minimum accepted signing key length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Root configuration structure loaded from house.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Exposes `GET /dummyLogin`. Development only.
    #[serde(default)]
    pub dummy_login_enabled: bool,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_secs() -> i64 {
    3 * 60 * 60
}

fn default_issuer() -> String {
    "house-service".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl_secs(),
            issuer: default_issuer(),
            dummy_login_enabled: false,
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:` for the in-process backend
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/house.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl HouseServiceConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: HouseServiceConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate values and the availability of referenced env vars
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must not be 0".to_string(),
            ));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_secs must be positive".to_string(),
            ));
        }
        if self.auth.issuer.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.issuer must not be empty".to_string(),
            ));
        }

        let secret = self.jwt_secret()?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ValidationError(format!(
                "{} must hold at least {} bytes",
                self.auth.jwt_secret_env, MIN_SECRET_LEN
            )));
        }

        if let Some(ref env) = self.database.turso_url_env {
            self.validate_env_var(env)?;
        }
        if let Some(ref env) = self.database.turso_token_env {
            self.validate_env_var(env)?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.auth.token_ttl_secs)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Picks the storage backend.
    ///
    /// Remote Turso wins when both env references are configured and the
    /// `turso` feature is compiled in; otherwise `:memory:` selects the
    /// in-process backend and anything else is a SQLite path.
    pub fn database_provider(&self) -> DatabaseProvider {
        #[cfg(feature = "turso")]
        {
            if let (Some(url_env), Some(token_env)) = (
                self.database.turso_url_env.as_deref(),
                self.database.turso_token_env.as_deref(),
            ) {
                if let (Some(url), Some(auth_token)) =
                    (self.resolve_env(url_env), self.resolve_env(token_env))
                {
                    return DatabaseProvider::Turso { url, auth_token };
                }
            }
        }

        if self.database.url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: self.database.url.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SECRET: &str = "test-secret-at-least-32-characters-long";

    fn create_test_config(secret_env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 9090
log_level = "debug"
log_format = "json"

[auth]
jwt_secret_env = "{}"
token_ttl_secs = 60
dummy_login_enabled = true

[database]
url = ":memory:"
"#,
            secret_env
        )
    }

    #[test]
    fn test_parse_config() {
        std::env::set_var("HOUSE_TEST_SECRET_PARSE", SECRET);

        let config: HouseServiceConfig =
            toml::from_str(&create_test_config("HOUSE_TEST_SECRET_PARSE")).expect("parse");

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.auth.issuer, "house-service");
        assert_eq!(config.token_ttl(), TimeDelta::seconds(60));
        assert!(config.auth.dummy_login_enabled);
        assert_eq!(config.database_provider(), DatabaseProvider::Memory);
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config: HouseServiceConfig = toml::from_str("").expect("parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret_env, "JWT_SECRET");
        assert_eq!(config.auth.token_ttl_secs, 10800);
        assert!(!config.auth.dummy_login_enabled);
        assert_eq!(
            config.database_provider(),
            DatabaseProvider::SQLite {
                path: "./data/house.db".to_string()
            }
        );
    }

    #[test]
    fn test_validation_missing_secret() {
        let mut config = HouseServiceConfig::default();
        config.auth.jwt_secret_env = "HOUSE_TEST_SECRET_UNSET".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(name)) if name == "HOUSE_TEST_SECRET_UNSET"
        ));
    }

    #[test]
    fn test_validation_short_secret() {
        std::env::set_var("HOUSE_TEST_SECRET_SHORT", "too-short");
        let mut config = HouseServiceConfig::default();
        config.auth.jwt_secret_env = "HOUSE_TEST_SECRET_SHORT".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        std::env::set_var("HOUSE_TEST_SECRET_VALUES", SECRET);
        let mut config = HouseServiceConfig::default();
        config.auth.jwt_secret_env = "HOUSE_TEST_SECRET_VALUES".to_string();
        assert!(config.validate().is_ok());

        let mut zero_ttl = config.clone();
        zero_ttl.auth.token_ttl_secs = 0;
        assert!(matches!(zero_ttl.validate(), Err(ConfigError::ValidationError(_))));

        let mut zero_port = config.clone();
        zero_port.server.port = 0;
        assert!(matches!(zero_port.validate(), Err(ConfigError::ValidationError(_))));

        let mut blank_issuer = config;
        blank_issuer.auth.issuer = "  ".to_string();
        assert!(matches!(blank_issuer.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_from_file() {
        std::env::set_var("HOUSE_TEST_SECRET_LOAD", SECRET);
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(create_test_config("HOUSE_TEST_SECRET_LOAD").as_bytes())
            .expect("write");

        let config = HouseServiceConfig::load(file.path()).expect("load");

        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_file() {
        let result = HouseServiceConfig::load("/definitely/not/here/house.toml");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[server\nport = ").expect("write");

        assert!(matches!(
            HouseServiceConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
