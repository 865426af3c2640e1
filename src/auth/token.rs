use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument, warn};

use super::types::Claims;
use crate::shared::AppError;

/// A token we fail to sign is our fault, not the caller's
fn signing_error(e: jsonwebtoken::errors::Error) -> AppError {
    warn!(error = %e, "Failed to encode JWT token");
    AppError::Internal
}

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl_minutes: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
        }
    }

    /// Signs a token for the given user, valid for `ttl_minutes`
    #[instrument(skip(self))]
    pub fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.ttl_minutes)).timestamp().max(0) as usize;

        debug!(
            ttl_minutes = self.ttl_minutes,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = Claims {
            user_id: user_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(signing_error)
    }

    /// Validates signature and expiry, returning the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                user_id = %data.claims.user_id,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("secret", 60);

        let token = config.create_token("user-123").unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, "user-123");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::new("secret", 60);
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::JwtError(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let issuer = TokenConfig::new("secret-a", 60);
        let verifier = TokenConfig::new("secret-b", 60);

        let token = issuer.create_token("user").unwrap();

        assert!(issuer.validate_token(&token).is_ok());
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AppError::JwtError(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s validation leeway
        let config = TokenConfig::new("secret", -5);
        let token = config.create_token("user").unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(AppError::JwtError(_))
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let config = TokenConfig::new("secret", 60);
        let token = config.create_token("user-a").unwrap();
        let other = config.create_token("user-b").unwrap();

        // Header and signature of one token, payload of another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(config.validate_token(&forged).is_err());
    }

    #[test]
    fn test_signing_failure_is_internal_error() {
        use axum::{http::StatusCode, response::IntoResponse};
        use jsonwebtoken::errors::{Error, ErrorKind};

        let error = signing_error(Error::from(ErrorKind::InvalidKeyFormat));
        assert!(matches!(error, AppError::Internal));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
