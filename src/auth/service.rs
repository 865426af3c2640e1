use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password_async, verify_password_async},
    token::TokenConfig,
    types::{LoginRequest, SignupRequest, TokenResponse},
};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

/// Service for signup and login
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository + Send + Sync>, token_config: TokenConfig) -> Self {
        Self {
            users,
            token_config,
        }
    }

    /// Registers a new account. The email must not be in use.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: SignupRequest) -> Result<UserModel, AppError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if self.users.find_by_email(&request.email).await?.is_some() {
            warn!("Signup attempted with an email that is already registered");
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let password_hash = hash_password_async(request.password).await?;
        let user = UserModel::new(
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            request.username.trim().to_string(),
            &request.email,
            password_hash,
        );

        // The repository enforces uniqueness again for concurrent signups
        self.users.create_user(&user).await?;

        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Checks credentials and issues a token. Unknown email and wrong password are indistinguishable.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        let user = self.users.find_by_email(&request.email).await?;

        let matched = verify_password_async(
            request.password,
            user.as_ref().map(|u| u.password_hash.clone()),
        )
        .await?;

        let user = match user {
            Some(user) if matched => user,
            _ => {
                warn!("Login failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.token_config.create_token(&user.id)?;
        info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse { token })
    }
}
