//! Admin login. A single account is configured through the environment; a
//! successful login returns a short-lived HS256 bearer token.

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl AuthKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        decode::<AdminClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("Admin token expired"),
                    ErrorKind::InvalidSignature => warn!("Admin token with invalid signature"),
                    _ => debug!("Malformed admin token: {e}"),
                }
                AppError::Unauthorized
            })
    }
}

/// Checks `password` against an argon2 PHC string on a blocking thread.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid admin password hash: {e}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(anyhow::anyhow!("password verification failed: {e}"))),
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("password task failed: {e}")))?
}

/// Present in a handler's arguments, rejects the request unless it carries a
/// valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.auth.verify(token.trim())?;
        Ok(AdminSession {
            username: claims.sub,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /admin/api/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let password_ok =
        verify_password(req.password, state.config.admin_password_hash.clone()).await?;

    if req.username != state.config.admin_username || !password_ok {
        warn!("Rejected admin login for '{}'", req.username);
        return Err(AppError::Unauthorized);
    }

    info!("Admin '{}' logged in", req.username);
    Ok(Json(LoginResponse {
        token: state.auth.issue(&req.username)?,
        token_type: "Bearer",
        expires_in: state.auth.ttl_secs(),
    }))
}
