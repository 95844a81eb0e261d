use actix_web::{HttpResponse, ResponseError};

/// Error taxonomy shared by every Lockstep crate.
///
/// Each variant carries a stable machine-readable kind (see [`LockstepError::kind`])
/// that is reused verbatim in WebSocket `room-error` events, so clients see the
/// same vocabulary over HTTP and over the event channel.
#[derive(Debug, thiserror::Error)]
pub enum LockstepError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        key: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LockstepError {
    /// Validation error without a named field
    pub fn validation(message: impl Into<String>) -> Self {
        LockstepError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Validation error attached to a specific input field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        LockstepError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LockstepError::Auth(_) => "auth_error",
            LockstepError::NotFound(_) => "not_found",
            LockstepError::Authorization(_) => "authorization_error",
            LockstepError::Validation { .. } => "validation_error",
            LockstepError::Configuration { .. } => "configuration_error",
            LockstepError::Internal(_) => "internal_error",
        }
    }
}

impl From<anyhow::Error> for LockstepError {
    fn from(err: anyhow::Error) -> Self {
        LockstepError::Internal(err.to_string())
    }
}

impl ResponseError for LockstepError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LockstepError::Auth(_) => StatusCode::UNAUTHORIZED,
            LockstepError::NotFound(_) => StatusCode::NOT_FOUND,
            LockstepError::Authorization(_) => StatusCode::FORBIDDEN,
            LockstepError::Validation { .. } => StatusCode::BAD_REQUEST,
            LockstepError::Configuration { .. } | LockstepError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "error_description": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(LockstepError::Auth("x".into()).kind(), "auth_error");
        assert_eq!(LockstepError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(
            LockstepError::Authorization("x".into()).kind(),
            "authorization_error"
        );
        assert_eq!(
            LockstepError::validation("bad input").kind(),
            "validation_error"
        );
        assert_eq!(LockstepError::Internal("x".into()).kind(), "internal_error");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            LockstepError::Auth("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            LockstepError::NotFound("ABCD1234".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LockstepError::Authorization("not the host".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LockstepError::validation("empty").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_response_body_carries_kind() {
        let resp = LockstepError::validation_field("message too long", "text").error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
