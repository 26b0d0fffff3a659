use serde::{Deserialize, Serialize};

use crate::services::auth::Profile;

/// Request body for `POST /auth/token`.
///
/// The profile has already been verified by the identity provider; this
/// endpoint only records the user and mints the bearer credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required");
        }
        if !email.contains('@') || email.len() > 320 {
            return Err("email is invalid");
        }
        Ok(())
    }

    pub fn into_profile(self) -> Profile {
        Profile {
            email: self.email.trim().to_ascii_lowercase(),
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Usually "Bearer"
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}
