use serde::{Deserialize, Serialize};

use crate::users::{dto::NewProfileRequest, model::User};

/// Request body for user registration. Missing fields surface as
/// per-field validation errors rather than decode failures.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile: Option<NewProfileRequest>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `data` payload returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}
