use actix_web::{get, post, web, Responder};
use log::{error, info, warn};

use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::session::{LoginRequest, LoginResponse, SessionResponse};
use crate::server::session::Session;
use crate::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[post("/api/login")]
/// Check credentials and hand out a session token
async fn login(body: web::Json<LoginRequest>, data: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let LoginRequest { username, password } = body.into_inner();
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };
    info!("login attempt username={}", username);

    let known = data.store().check_credentials(&username, &password).await.map_err(|e| {
        error!("login failed, {}", e);
        ApiError::from(e)
    })?;
    if !known {
        warn!("login rejected username={}", username);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    let token = data.sessions().issue(&username).map_err(|e| {
        error!("signing session for {} failed, {}", username, e);
        ApiError::Internal
    })?;
    Ok(web::Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
    }))
}

#[get("/api/session")]
/// Who the bearer token belongs to
async fn current_session(session: Session) -> impl Responder {
    web::Json(SessionResponse {
        success: true,
        username: session.username,
    })
}
