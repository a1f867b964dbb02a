//! Session tokens and the per-request `Session` extractor

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::server::controller::error::ApiError;
use crate::server::model::config::SessionConfig;
use crate::server::state::AppState;
use crate::server::util::time;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs with the current secret, verifies with the current or the previous one.
#[derive(Clone)]
pub(crate) struct SessionKeys {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
    ttl: chrono::Duration,
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        let decoding = std::iter::once(&config.secret)
            .chain(config.previous_secret.as_ref())
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding,
            ttl: config.ttl,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = time::helper::get_utc_now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Username carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Option<String> {
        // expiry is checked against the app clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = self.decoding.iter().find_map(|key| {
            jsonwebtoken::decode::<Claims>(token, key, &validation)
                .map(|data| data.claims)
                .ok()
        })?;
        if claims.exp <= time::helper::get_utc_now().timestamp() {
            debug!("session for {} expired", claims.sub);
            return None;
        }
        Some(claims.sub)
    }
}

/// Logged-in user of the current request, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub username: String,
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            warn!("app state missing, cannot resolve session");
            return ready(Err(ApiError::Internal));
        };
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        ready(
            token
                .and_then(|token| state.sessions().verify(token.trim()))
                .map(|username| Session { username })
                .ok_or(ApiError::Unauthorized("Not logged in")),
        )
    }
}
