//! Authentication and envelope models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every backend response is wrapped in this envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Authenticated session returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// `name=value` cookie pair to send back
    pub cookie: String,

    /// When the client should stop trusting the session
    pub expires_at: DateTime<Utc>,

    /// Logged-in user, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Usuario>,
}

/// Backend user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    #[serde(deserialize_with = "super::lenient::i64")]
    pub id: i64,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}
