use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lockstep_core::{LockstepError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_TTL_SECS: i64 = 24 * 3600;

/// JWT claims issued by the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Display name shown to other participants
    pub username: String,
    /// Guest accounts carry no registered credentials
    #[serde(default)]
    pub is_anonymous: bool,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID (unique identifier)
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: String, username: String, is_anonymous: bool) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            username,
            is_anonymous,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Verified identity bound to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub is_anonymous: bool,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            is_anonymous: claims.is_anonymous,
        }
    }
}

/// HS256 token verifier
///
/// Verifies tokens minted by the external auth service with a shared secret.
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a token and resolve the identity it carries
    pub fn verify(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| LockstepError::Auth(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims.into())
    }

    /// Mint a token for the given identity
    ///
    /// Used by tests and local tooling; production tokens come from the auth
    /// collaborator.
    pub fn mint(&self, user_id: &str, username: &str, is_anonymous: bool) -> Result<String> {
        let claims = Claims::new(user_id.to_string(), username.to_string(), is_anonymous);
        self.sign(&claims)
    }

    /// Sign explicit claims
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| LockstepError::Internal(format!("Failed to encode JWT: {}", e)))
    }
}

/// Extract the token from an `Authorization` header value
pub fn extract_bearer_token(auth_header: &str) -> Result<&str> {
    if !auth_header.starts_with("Bearer ") {
        return Err(LockstepError::Auth("Missing Bearer prefix".to_string()));
    }

    Ok(&auth_header[7..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("unit-test-secret-0123456789")
    }

    #[test]
    fn test_token_round_trip() {
        let verifier = verifier();
        let token = verifier.mint("user-1", "alice", false).unwrap();

        let identity = verifier.verify(&token).unwrap();
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.username, "alice");
        assert!(!identity.is_anonymous);
    }

    #[test]
    fn test_anonymous_flag_survives_round_trip() {
        let verifier = verifier();
        let token = verifier.mint("guest-7", "guest", true).unwrap();

        let identity = verifier.verify(&token).unwrap();
        assert!(identity.is_anonymous);
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = verifier();
        let mut claims = Claims::new("user-1".to_string(), "alice".to_string(), false);
        // Far enough in the past to clear the default leeway
        claims.iat -= 7200;
        claims.exp = claims.iat + 1;

        let token = verifier.sign(&claims).unwrap();
        let err = verifier.verify(&token).unwrap_err();
        assert_eq!(err.kind(), "auth_error");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = verifier().mint("user-1", "alice", false).unwrap();

        let other = TokenVerifier::new("a-different-secret-9876543210");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let token = extract_bearer_token("Bearer abc123").unwrap();
        assert_eq!(token, "abc123");

        assert!(extract_bearer_token("abc123").is_err());
        assert!(extract_bearer_token("Basic abc123").is_err());
    }
}
