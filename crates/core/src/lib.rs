//! # Lockstep Core
//!
//! Shared building blocks for the Lockstep platform: the error taxonomy,
//! environment-driven configuration loading, and validation helpers used by
//! the auth and rooms crates.
//!
//! ## Modules
//!
//! - `error`: the `LockstepError` taxonomy and its HTTP mapping
//! - `config`: `ConfigLoader` trait plus service/room/auth config structs
//! - `validation`: input validation helpers and regex patterns

pub mod config;
pub mod error;
pub mod validation;

pub use config::{load_dotenv, AuthConfig, ConfigLoader, RoomConfig, ServiceConfig};
pub use error::LockstepError;
pub use validation::{validate_chat_message, validate_display_name, validate_video_url};

/// Result type alias for Lockstep operations
pub type Result<T> = std::result::Result<T, LockstepError>;
