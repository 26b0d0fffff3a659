use std::sync::Arc;

use tracing::error;

use crate::error::AppError;
use crate::repos::user_repo::{NewUser, UserRow};
use crate::services::auth::{access_jwt::Identity, jwt::JwtIssuer, user_store::UserStore};

/// Profile handed over by the identity provider after it has verified the user.
#[derive(Debug, Clone)]
pub struct Profile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Token issuance and user bookkeeping around a successful sign-in.
#[derive(Clone)]
pub struct AuthService {
    jwt: JwtIssuer,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(jwt: JwtIssuer, users: Arc<dyn UserStore>) -> Self {
        Self { jwt, users }
    }

    /// Create the user on first sign-in; existing users are left untouched.
    pub async fn store_user(&self, profile: &Profile) -> Result<bool, AppError> {
        let existing = self
            .users
            .find_by_email(&profile.email)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to look up user");
                AppError::Internal
            })?;

        if existing.is_none() {
            let created = self
                .users
                .create(NewUser {
                    email: &profile.email,
                    first_name: profile.first_name.as_deref(),
                    last_name: profile.last_name.as_deref(),
                })
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to create user");
                    AppError::Internal
                })?;
            tracing::info!(user_id = %created.id, "created user on first sign-in");
        }

        Ok(true)
    }

    /// Issue an access token whose payload is `{email, iat, exp}`.
    pub fn generate_token(&self, email: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Identity::new(email, now, self.jwt.ttl_seconds());
        self.jwt.sign(&claims)
    }

    /// Resolve the stored user behind a verified identity.
    pub async fn validate_user(&self, identity: &Identity) -> Result<Option<UserRow>, AppError> {
        self.users.find_by_email(&identity.email).await.map_err(|e| {
            error!(error = %e, "failed to look up user");
            AppError::Internal
        })
    }

    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.jwt.ttl_seconds()
    }
}
