//! Identity boundary errors.
//!
//! Ledger failures carry their own taxonomy in `inkwell-core`; this type
//! covers the caller authentication that happens before the engine runs.

use thiserror::Error;

use crate::jwt::JwtError;

/// Authentication failures of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// No usable credentials were presented.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The bearer token is past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    /// The bearer token could not be decoded or verified.
    #[error("Invalid or malformed token")]
    InvalidToken,
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) | Self::TokenExpired | Self::InvalidToken => 401,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::DecodingError(_) | JwtError::EncodingError(_) => Self::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized("missing".into()), "UNAUTHORIZED")]
    #[case(AppError::TokenExpired, "TOKEN_EXPIRED")]
    #[case(AppError::InvalidToken, "INVALID_TOKEN")]
    fn test_every_variant_is_unauthorized(#[case] err: AppError, #[case] code: &str) {
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_from_jwt_error() {
        assert_eq!(AppError::from(JwtError::Expired), AppError::TokenExpired);
        assert_eq!(
            AppError::from(JwtError::DecodingError("bad signature".into())),
            AppError::InvalidToken
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(AppError::TokenExpired.to_string(), "Token has expired");
    }
}
