use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{CreateUser, LoginRequest, User, UserId};
use crate::infrastructure::security::{
    generate_token, hash_password, validate_token, verify_password,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: CreateUser) -> Result<(User, String)> {
        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            warn!("Registration rejected, missing fields");
            return Err(
                DomainError::Validation("Please provide name, email and password".to_string())
                    .into(),
            );
        }

        if self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!(email = %req.email, "Email already registered");
            return Err(
                DomainError::Conflict("User with this email already exists".to_string()).into(),
            );
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: UserId::new(),
            name: req.name,
            email: req.email,
            password_hash,
        };

        debug!(user_id = %user.id, "Saving user to repository");
        self.user_repository.save_user(user.clone()).await?;

        let token = self.issue_token(&user.id)?;

        info!(user_id = %user.id, email = %user.email, "User registered successfully");
        Ok((user, token))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(User, String)> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(
                DomainError::Validation("Please provide email and password".to_string()).into(),
            );
        }

        let user = self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "Login attempt for unknown email");
                DomainError::Unauthorized("Invalid email or password".to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized("Invalid email or password".to_string()).into());
        }

        let token = self.issue_token(&user.id)?;

        info!(user_id = %user.id, email = %user.email, "Login successful");
        Ok((user, token))
    }

    /// Resolves a bearer token into the identity every protected handler
    /// runs as. Malformed, expired, or wrongly signed tokens are all
    /// reported the same way.
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<UserId> {
        validate_token(token, &self.jwt_secret).map_err(|e| {
            warn!(error = %e, "Token validation failed");
            DomainError::Unauthorized("Invalid or expired token".to_string()).into()
        })
    }

    fn issue_token(&self, user_id: &UserId) -> Result<String> {
        generate_token(user_id, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e)).into()
        })
    }
}
