/// Account service - sign-up and credential checks
use std::sync::Arc;
use tracing::info;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::forms::{FieldErrorKind, FormErrors, SignupInput};
use crate::models::User;
use crate::security::{hash_password, verify_password};

pub struct AccountService {
    repo: Arc<dyn BlogRepository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// Register a user. A taken username comes back as a field error.
    pub async fn signup(&self, input: SignupInput) -> Result<User> {
        let taken = || {
            AppError::Validation(FormErrors::single(
                "username",
                FieldErrorKind::Duplicate,
                "A user with that username already exists.",
            ))
        };

        if self.repo.find_user_by_username(&input.username).await?.is_some() {
            return Err(taken());
        }

        let password_hash = hash_password(&input.password)?;
        let user = match self.repo.create_user(&input.username, &password_hash).await {
            Ok(user) => user,
            // Lost a race with a concurrent sign-up
            Err(AppError::Conflict(_)) => return Err(taken()),
            Err(err) => return Err(err),
        };

        info!(user_id = user.id, username = %user.username, "user signed up");
        Ok(user)
    }

    /// The user if the password matches, `None` otherwise
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = match self.repo.find_user_by_username(username.trim()).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
