use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_VAR: &str = "TODO_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Shortest HS256 secret we accept.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime we accept: ten years.
pub const MAX_EXP_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Process-wide configuration, resolved once at startup.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Allow any origin, for the web build of the mobile client.
    #[serde(default)]
    pub cors_permissive: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

/// Token signing settings. `exp_seconds` unset means tokens never expire.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default)]
    pub exp_seconds: Option<i64>,
}

/// Argon2id work factor.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        PasswordConfig {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,  // e.g. "info", "debug", "warn"
    pub format: String, // "json" or "console"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "console".to_string(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_ms() -> u64 {
    3000
}

fn default_issuer() -> String {
    "todo-api".to_string()
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt.secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if let Some(exp) = self.jwt.exp_seconds {
            if exp <= 0 || exp > MAX_EXP_SECONDS {
                return Err(ConfigError::Invalid(format!(
                    "jwt.exp_seconds must be between 1 and {MAX_EXP_SECONDS}"
                )));
            }
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds the figment: YAML file first, then `TODO_API_*` env overrides
/// (`TODO_API_JWT__SECRET` sets `jwt.secret`).
pub fn figment(path: &str) -> Figment {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("TODO_API_").ignore(&["CONFIG"]).split("__"))
}

/// Load and validate the config from the file named by `TODO_API_CONFIG`,
/// falling back to `./config.yaml`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config: AppConfig = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}
