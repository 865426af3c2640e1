use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::error::ClientError;
use crate::auth::Claims;

/// A signed-in user as seen from the client side
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSession {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl ClientSession {
    /// Reads the claims out of a login token. The signature is the server's
    /// business; the client only needs the owner and the expiry.
    pub fn from_token(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| ClientError::InvalidToken(e.to_string()))?
            .claims;

        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| ClientError::InvalidToken(format!("bad exp {}", claims.exp)))?;

        Ok(Self {
            token,
            user_id: claims.user_id,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
