use std::env;
use std::time::Duration;

use auth::HashCost;
use auth::RefreshPolicy;
use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL; identities are kept in memory when absent.
    pub url: Option<String>,
    pub max_connections: u32,
    /// Upper bound for every credential store round trip.
    pub timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub rotate_refresh_tokens: bool,
}

impl JwtConfig {
    /// # Errors
    /// * `Message` - A TTL is out of range, or refresh is not longer than access
    pub fn lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        let access = ttl("jwt.access_ttl_seconds", self.access_ttl_seconds)?;
        let refresh = ttl("jwt.refresh_ttl_seconds", self.refresh_ttl_seconds)?;

        TokenLifetimes::new(access, refresh).map_err(|e| ConfigError::Message(e.to_string()))
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        if self.rotate_refresh_tokens {
            RefreshPolicy::Rotate
        } else {
            RefreshPolicy::Reuse
        }
    }
}

fn ttl(key: &str, seconds: i64) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::try_seconds(seconds)
        .ok_or_else(|| ConfigError::Message(format!("{} is out of range: {}", key, seconds)))
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl From<PasswordConfig> for HashCost {
    fn from(config: PasswordConfig) -> Self {
        HashCost {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080)?
            .set_default("database.max_connections", 5)?
            .set_default("database.timeout_ms", 2000)?
            .set_default("jwt.access_ttl_seconds", 15 * 60)?
            .set_default("jwt.refresh_ttl_seconds", 7 * 24 * 60 * 60)?
            .set_default("jwt.rotate_refresh_tokens", true)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        self.jwt.lifetimes()?;

        if self.database.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "database.timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig { http_port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                timeout_ms: 2000,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
                access_ttl_seconds: 900,
                refresh_ttl_seconds: 604_800,
                rotate_refresh_tokens: true,
            },
            password: PasswordConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_short_secret() {
        let mut config = config();
        config.jwt.secret = "short".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_refresh_not_longer_than_access() {
        let mut config = config();
        config.jwt.refresh_ttl_seconds = config.jwt.access_ttl_seconds;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_ttl() {
        let mut config = config();
        config.jwt.refresh_ttl_seconds = i64::MAX;

        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("jwt.refresh_ttl_seconds"));
    }

    #[test]
    fn test_rejects_negative_access_ttl() {
        let mut config = config();
        config.jwt.access_ttl_seconds = -1;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_policy() {
        let mut config = config();
        assert_eq!(config.jwt.refresh_policy(), RefreshPolicy::Rotate);

        config.jwt.rotate_refresh_tokens = false;
        assert_eq!(config.jwt.refresh_policy(), RefreshPolicy::Reuse);
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("test-secret-key"));
    }
}
