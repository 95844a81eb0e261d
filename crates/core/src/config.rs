//! Configuration loading for Lockstep services
//!
//! Environment-driven configuration with typed parsing, validation, and
//! `.env` file support. All variables use the `LOCKSTEP_` prefix, with bare
//! fallbacks (`HOST`, `PORT`, `RUST_LOG`, `JWT_SECRET`) for container
//! deployments that inject the conventional names.
//!
//! Override hierarchy: defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use lockstep_core::config::{load_dotenv, AuthConfig, ConfigLoader, RoomConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let service = ServiceConfig::from_env()?;
//! let rooms = RoomConfig::from_env()?;
//! let auth = AuthConfig::from_env()?;
//!
//! service.validate()?;
//! rooms.validate()?;
//! auth.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::LockstepError;
use std::time::Duration;

/// Configuration loader trait
///
/// Standardized loading and validation of configuration from environment
/// variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables, applying defaults for
    /// missing optional values.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a required variable is missing or a
    /// value cannot be parsed.
    fn from_env() -> Result<Self, LockstepError>;

    /// Validate configuration values against acceptable ranges.
    fn validate(&self) -> Result<(), LockstepError>;
}

/// HTTP service configuration
///
/// # Environment Variables
///
/// - `LOCKSTEP_SERVICE_HOST` (optional): bind host (default: "0.0.0.0")
/// - `LOCKSTEP_SERVICE_PORT` (optional): bind port (default: 8090)
/// - `LOCKSTEP_SERVICE_WORKERS` (optional): worker threads (default: CPU count)
/// - `LOCKSTEP_SERVICE_LOG_LEVEL` (optional): log level (default: "info")
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service bind host
    pub host: String,
    /// Service bind port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            workers: num_cpus::get(),
            log_level: "info".to_string(),
        }
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, LockstepError> {
        let host = std::env::var("LOCKSTEP_SERVICE_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| ServiceConfig::default().host);

        let port = parse_env_var("LOCKSTEP_SERVICE_PORT", ServiceConfig::default().port)
            .or_else(|_| parse_env_var("PORT", ServiceConfig::default().port))?;

        let workers = parse_env_var("LOCKSTEP_SERVICE_WORKERS", ServiceConfig::default().workers)?;

        let log_level = std::env::var("LOCKSTEP_SERVICE_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| ServiceConfig::default().log_level);

        Ok(Self {
            host,
            port,
            workers,
            log_level,
        })
    }

    fn validate(&self) -> Result<(), LockstepError> {
        if self.port == 0 {
            return Err(LockstepError::Configuration {
                message: "port must be greater than 0".to_string(),
                key: Some("LOCKSTEP_SERVICE_PORT".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(LockstepError::Configuration {
                message: "workers must be greater than 0".to_string(),
                key: Some("LOCKSTEP_SERVICE_WORKERS".to_string()),
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(LockstepError::Configuration {
                message: format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                key: Some("LOCKSTEP_SERVICE_LOG_LEVEL".to_string()),
            });
        }

        Ok(())
    }
}

/// Room engine configuration
///
/// # Environment Variables
///
/// - `LOCKSTEP_ROOM_GRACE_PERIOD` (optional): seconds a dropped connection's
///   participant identity is preserved before removal, and an empty room is
///   kept before retirement (default: 30)
/// - `LOCKSTEP_ROOM_MAX_MESSAGE_LENGTH` (optional): chat message length bound
///   in characters (default: 500)
/// - `LOCKSTEP_ROOM_HEARTBEAT_INTERVAL` (optional): WebSocket ping interval
///   in seconds (default: 30)
/// - `LOCKSTEP_ROOM_CLIENT_TIMEOUT` (optional): seconds without a heartbeat
///   before a client connection is dropped (default: 60)
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Reconnect/retirement grace period
    pub grace_period: Duration,
    /// Maximum accepted chat message length, in characters
    pub max_message_len: usize,
    /// WebSocket heartbeat ping interval
    pub heartbeat_interval: Duration,
    /// WebSocket client liveness timeout
    pub client_timeout: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(30),
            max_message_len: 500,
            heartbeat_interval: Duration::from_secs(30),
            client_timeout: Duration::from_secs(60),
        }
    }
}

impl ConfigLoader for RoomConfig {
    fn from_env() -> Result<Self, LockstepError> {
        let grace_secs = parse_env_var("LOCKSTEP_ROOM_GRACE_PERIOD", 30u64)?;
        let max_message_len = parse_env_var(
            "LOCKSTEP_ROOM_MAX_MESSAGE_LENGTH",
            RoomConfig::default().max_message_len,
        )?;
        let heartbeat_secs = parse_env_var("LOCKSTEP_ROOM_HEARTBEAT_INTERVAL", 30u64)?;
        let timeout_secs = parse_env_var("LOCKSTEP_ROOM_CLIENT_TIMEOUT", 60u64)?;

        Ok(Self {
            grace_period: Duration::from_secs(grace_secs),
            max_message_len,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            client_timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), LockstepError> {
        if self.grace_period.is_zero() {
            return Err(LockstepError::Configuration {
                message: "grace_period must be greater than 0 seconds".to_string(),
                key: Some("LOCKSTEP_ROOM_GRACE_PERIOD".to_string()),
            });
        }

        if self.max_message_len == 0 {
            return Err(LockstepError::Configuration {
                message: "max_message_len must be greater than 0".to_string(),
                key: Some("LOCKSTEP_ROOM_MAX_MESSAGE_LENGTH".to_string()),
            });
        }

        if self.client_timeout <= self.heartbeat_interval {
            return Err(LockstepError::Configuration {
                message: format!(
                    "client_timeout ({}s) must exceed heartbeat_interval ({}s)",
                    self.client_timeout.as_secs(),
                    self.heartbeat_interval.as_secs()
                ),
                key: Some("LOCKSTEP_ROOM_CLIENT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// Token verification configuration
///
/// # Environment Variables
///
/// - `LOCKSTEP_AUTH_JWT_SECRET` (required): HS256 signing secret shared with
///   the auth collaborator (fallback: `JWT_SECRET`)
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
}

impl ConfigLoader for AuthConfig {
    fn from_env() -> Result<Self, LockstepError> {
        let jwt_secret = std::env::var("LOCKSTEP_AUTH_JWT_SECRET")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .map_err(|_| LockstepError::Configuration {
                message: "JWT_SECRET or LOCKSTEP_AUTH_JWT_SECRET must be set".to_string(),
                key: Some("LOCKSTEP_AUTH_JWT_SECRET".to_string()),
            })?;

        Ok(Self { jwt_secret })
    }

    fn validate(&self) -> Result<(), LockstepError> {
        if self.jwt_secret.len() < 16 {
            return Err(LockstepError::Configuration {
                message: "jwt_secret must be at least 16 characters".to_string(),
                key: Some("LOCKSTEP_AUTH_JWT_SECRET".to_string()),
            });
        }

        Ok(())
    }
}

/// Helper to parse an environment variable with a default value
fn parse_env_var<T>(key: &str, default: T) -> Result<T, LockstepError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>().map_err(|e| LockstepError::Configuration {
                message: format!("Failed to parse {}: {}", key, e),
                key: Some(key.to_string()),
            })
        })
        .unwrap_or(Ok(default))
}

/// Load a `.env` file if present
///
/// Does not error when the file is absent.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn set_test_env(key: &str, value: &str) {
        env::set_var(key, value);
    }

    fn clear_test_env(key: &str) {
        env::remove_var(key);
    }

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8090);
        assert_eq!(config.log_level, "info");
        assert!(config.workers > 0);
    }

    #[test]
    fn test_service_config_from_env() {
        set_test_env("LOCKSTEP_SERVICE_HOST", "127.0.0.1");
        set_test_env("LOCKSTEP_SERVICE_PORT", "3000");
        set_test_env("LOCKSTEP_SERVICE_WORKERS", "4");
        set_test_env("LOCKSTEP_SERVICE_LOG_LEVEL", "debug");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.log_level, "debug");

        clear_test_env("LOCKSTEP_SERVICE_HOST");
        clear_test_env("LOCKSTEP_SERVICE_PORT");
        clear_test_env("LOCKSTEP_SERVICE_WORKERS");
        clear_test_env("LOCKSTEP_SERVICE_LOG_LEVEL");
    }

    #[test]
    fn test_service_config_validation_invalid_log_level() {
        let mut config = ServiceConfig::default();
        config.log_level = "verbose".to_string();

        let result = config.validate();
        assert!(result.is_err());
        match result.unwrap_err() {
            LockstepError::Configuration { message, .. } => {
                assert!(message.contains("Invalid log_level"));
            }
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_service_config_validation_zero_port() {
        let mut config = ServiceConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(30));
        assert_eq!(config.max_message_len, 500);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.client_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_room_config_from_env() {
        set_test_env("LOCKSTEP_ROOM_GRACE_PERIOD", "10");
        set_test_env("LOCKSTEP_ROOM_MAX_MESSAGE_LENGTH", "200");

        let config = RoomConfig::from_env().unwrap();
        assert_eq!(config.grace_period, Duration::from_secs(10));
        assert_eq!(config.max_message_len, 200);

        clear_test_env("LOCKSTEP_ROOM_GRACE_PERIOD");
        clear_test_env("LOCKSTEP_ROOM_MAX_MESSAGE_LENGTH");
    }

    #[test]
    fn test_room_config_validation_timeout_must_exceed_heartbeat() {
        let mut config = RoomConfig::default();
        config.heartbeat_interval = Duration::from_secs(60);
        config.client_timeout = Duration::from_secs(30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_config_requires_secret() {
        clear_test_env("LOCKSTEP_AUTH_JWT_SECRET");
        clear_test_env("JWT_SECRET");
        assert!(AuthConfig::from_env().is_err());
    }

    #[test]
    fn test_auth_config_validation_short_secret() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
        };
        assert!(config.validate().is_err());

        let config = AuthConfig {
            jwt_secret: "a-sufficiently-long-test-secret".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_env_var_with_default() {
        let result: u32 = parse_env_var("LOCKSTEP_NON_EXISTENT_VAR", 42).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_env_var_invalid_value() {
        set_test_env("LOCKSTEP_TEST_INVALID_VAR", "not-a-number");
        let result: Result<u32, _> = parse_env_var("LOCKSTEP_TEST_INVALID_VAR", 42);
        assert!(result.is_err());
        clear_test_env("LOCKSTEP_TEST_INVALID_VAR");
    }
}
