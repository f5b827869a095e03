//! Registration, login and session validation

use std::sync::Arc;

use common::error::{ServiceError, ServiceResult};
use tracing::{debug, error, info, warn};

use crate::{
    jwt::{IssuedToken, JwtConfig, JwtService},
    models::{NewUser, Role, User, UserProfile},
    password::{hash_password, verify_password},
    repositories::UserStore,
    validation::{validate_email, validate_password, validate_profile},
};

/// Message shared by every login failure so callers cannot tell an unknown
/// email from a wrong password.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authentication service
///
/// Owns the signing key (injected through [`JwtConfig`]) and talks to the
/// credential store through [`UserStore`]. Tokens are stateless: there is no
/// revocation list, but every role check re-reads the user.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthManager {
    pub fn new(users: Arc<dyn UserStore>, jwt_config: JwtConfig) -> Self {
        Self {
            users,
            jwt: JwtService::new(jwt_config),
        }
    }

    /// Register a new user
    ///
    /// Fails with `Conflict` when the email is taken, either on the upfront
    /// check or when the store's unique constraint catches a concurrent
    /// registration. Only the Argon2 hash of `password` is stored.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: UserProfile,
        role: Option<Role>,
    ) -> ServiceResult<User> {
        validate_email(email).map_err(ServiceError::Validation)?;
        validate_password(password).map_err(ServiceError::Validation)?;
        validate_profile(&profile).map_err(ServiceError::Validation)?;

        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| ServiceError::storage("looking up email", e))?;
        if existing.is_some() {
            return Err(email_taken(email));
        }

        let password_hash = hash_password(password).map_err(|e| {
            error!("Failed to hash password: {}", e);
            ServiceError::Validation("password could not be processed".to_string())
        })?;

        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
            profile,
            role: role.unwrap_or_default(),
        };

        let id = self.users.insert(&new_user).await.map_err(|e| {
            if e.is_unique_violation() {
                email_taken(email)
            } else {
                ServiceError::storage("creating user", e)
            }
        })?;

        info!("Registered user {} with role {}", id, new_user.role);

        self.users
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::storage("reading new user", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", id)))
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<(User, IssuedToken)> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| ServiceError::storage("looking up email", e))?;

        let user = match user {
            Some(user) if user.is_active => user,
            Some(_) => {
                debug!("Login rejected for inactive account");
                return Err(invalid_credentials());
            }
            None => {
                debug!("Login rejected for unknown email");
                return Err(invalid_credentials());
            }
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Login rejected for user {}: password mismatch", user.id);
                return Err(invalid_credentials());
            }
            Err(e) => {
                error!("Stored password hash for user {} is unreadable: {}", user.id, e);
                return Err(invalid_credentials());
            }
        }

        let token = self.jwt.issue(user.id).map_err(|e| {
            error!("Failed to sign token for user {}: {}", user.id, e);
            ServiceError::Internal("could not issue session token".to_string())
        })?;

        info!("User {} logged in", user.id);
        Ok((user, token))
    }

    /// Check a token's signature and expiry and return the user id it carries
    pub fn validate_token(&self, token: &str) -> ServiceResult<i64> {
        self.jwt
            .validate(token)
            .map(|claims| claims.sub)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                ServiceError::Unauthorized("invalid or expired token".to_string())
            })
    }

    /// Validate a token against the live user record
    ///
    /// A cryptographically valid token is still refused once its user is
    /// gone or deactivated.
    pub async fn validate_token_with_role(&self, token: &str) -> ServiceResult<(i64, Role)> {
        let user_id = self.validate_token(token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| ServiceError::storage("loading token owner", e))?;

        match user {
            Some(user) if user.is_active => Ok((user.id, user.role)),
            _ => {
                warn!("Token presented for missing or inactive user {}", user_id);
                Err(ServiceError::Unauthorized(
                    "invalid or expired token".to_string(),
                ))
            }
        }
    }

    /// Fetch a user by id
    pub async fn get_user(&self, user_id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|e| ServiceError::storage("loading user", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

fn email_taken(email: &str) -> ServiceError {
    ServiceError::Conflict(format!("email {} is already registered", email))
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string())
}
