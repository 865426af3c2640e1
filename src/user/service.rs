use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    repository::UserRepository,
    types::{UpdateProfileRequest, UserProfile},
};
use crate::shared::AppError;

/// Service for profile reads and name updates
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .map(|user| user.to_profile())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Trims both names; the first name must not be blank
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, AppError> {
        let first_name = request
            .first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Validation("First name is required".to_string()))?;
        let last_name = request.last_name.as_deref().map(str::trim).unwrap_or("");

        let user = self
            .repository
            .update_names(user_id, first_name, last_name)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!(user_id = %user_id, "Profile updated");
        Ok(user.to_profile())
    }
}
