use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub success: bool,
    pub username: String,
}
