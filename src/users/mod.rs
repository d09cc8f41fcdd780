/// User identity and sessions
///
/// The identity collaborator for the rest of the server: registration,
/// login, and bearer-token validation.

mod manager;

pub use manager::UserManager;

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub username: String,
    pub password: String,
}

/// Session response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub username: String,
    pub access_token: String,
    pub is_admin: bool,
}

/// Validated session from bearer token
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub user_id: String,
    pub username: String,
    pub session_id: String,
    pub is_admin: bool,
}
