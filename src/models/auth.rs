//! Authentication-related models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name; falls back to the email's local part when absent or blank
    #[serde(default)]
    #[validate(length(max = 64, message = "name must be at most 64 characters"))]
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Display name to store for the new account
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }

        self.email
            .rsplit_once('@')
            .map(|(local, _)| local.to_string())
            .unwrap_or_default()
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[schema(value_type = String, example = "Bearer")]
    pub token_type: &'static str,
    pub expires_in: i64, // seconds until the token expires
}
