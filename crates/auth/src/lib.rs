//! # Lockstep Auth
//!
//! Bearer-token verification for the Lockstep platform.
//!
//! Account registration and login live in an external collaborator; this
//! crate covers the consuming side of that boundary: verifying a signed
//! token into an [`Identity`] that the rooms engine binds to a connection.
//! A mint helper is included for tests and local tooling.

pub mod token;

pub use token::{extract_bearer_token, Claims, Identity, TokenVerifier};
