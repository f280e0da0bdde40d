//! Admin login and bearer-token verification.
//!
//! Tokens are HS256 JWTs carrying `sub`, `role` and `exp`. Protected handlers
//! take an `AdminUser` parameter; a missing, forged or expired token is
//! rejected with 401 before the handler runs.

use axum::Json;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::Serialize;
use sha2::Sha256;
use tracing::{info, warn};

use super::error::ServerError;
use super::state::AppState;
use crate::api::{Credentials, LoginResponse};
use crate::session::{decode_claims, now_unix};

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
pub const ADMIN_ROLE: &str = "admin";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a random 32-byte hex secret.
#[must_use]
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// HS256
// =============================================================================

fn keyed(secret: &[u8]) -> Result<HmacSha256, ServerError> {
    HmacSha256::new_from_slice(secret).map_err(|_| ServerError::Signing)
}

fn sign(secret: &str, signing_input: &str) -> Result<Vec<u8>, ServerError> {
    let mut mac = keyed(secret.as_bytes())?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compare `provided` against `expected` without leaking where they differ.
/// Both sides are MACed under `key` so the comparison length is fixed.
fn secret_matches(key: &str, expected: &str, provided: &str) -> Result<bool, ServerError> {
    let mut mac = keyed(key.as_bytes())?;
    mac.update(provided.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut check = keyed(key.as_bytes())?;
    check.update(expected.as_bytes());
    Ok(check.verify_slice(&tag).is_ok())
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    role: &'a str,
    iat: i64,
    exp: i64,
}

/// Sign a token for `subject` valid until `now + ttl_secs`.
///
/// # Errors
///
/// Returns `ServerError::Signing` if the claims cannot be encoded or the
/// key is rejected.
pub fn issue_token(secret: &str, subject: &str, now: i64, ttl_secs: i64) -> Result<String, ServerError> {
    let claims = IssuedClaims { sub: subject, role: ADMIN_ROLE, iat: now, exp: now.saturating_add(ttl_secs) };
    let header = URL_SAFE_NO_PAD.encode(JWT_HEADER);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|_| ServerError::Signing)?);
    let signing_input = format!("{header}.{payload}");
    let signature = URL_SAFE_NO_PAD.encode(sign(secret, &signing_input)?);
    Ok(format!("{signing_input}.{signature}"))
}

/// Check signature, role and expiry. Returns the subject on success.
///
/// # Errors
///
/// Returns `ServerError::Unauthorized` describing the first failed check.
pub fn verify_token(secret: &str, token: &str, now: i64) -> Result<String, ServerError> {
    let Some((signing_input, signature)) = token.rsplit_once('.') else {
        return Err(ServerError::Unauthorized("malformed token"));
    };
    let provided = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| ServerError::Unauthorized("malformed token"))?;
    let mut mac = keyed(secret.as_bytes())?;
    mac.update(signing_input.as_bytes());
    if mac.verify_slice(&provided).is_err() {
        return Err(ServerError::Unauthorized("invalid token signature"));
    }

    let claims = decode_claims(token).map_err(|_| ServerError::Unauthorized("malformed token"))?;
    if claims.role.as_deref() != Some(ADMIN_ROLE) {
        return Err(ServerError::Unauthorized("admin role required"));
    }
    match claims.exp {
        Some(exp) if exp > now => {}
        _ => return Err(ServerError::Unauthorized("token expired")),
    }
    claims.sub.ok_or(ServerError::Unauthorized("token has no subject"))
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated administrator extracted from the `Authorization` header.
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .unwrap_or_default();
        if token.is_empty() {
            return Err(ServerError::Unauthorized("missing bearer token"));
        }

        let app_state = AppState::from_ref(state);
        let email = verify_token(&app_state.config.jwt_secret, token, now_unix()).inspect_err(|e| {
            warn!(error = %e, "rejected bearer token");
        })?;
        Ok(Self { email })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /auth/login`: exchange admin credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ServerError> {
    let config = &state.config;
    let email_ok = credentials.email.trim().eq_ignore_ascii_case(&config.admin_email);
    let password_ok = secret_matches(&config.jwt_secret, &config.admin_password, &credentials.password)?;
    if !(email_ok && password_ok) {
        warn!(email = %credentials.email, "login rejected");
        return Err(ServerError::Unauthorized("invalid email or password"));
    }

    let token = issue_token(&config.jwt_secret, &config.admin_email, now_unix(), config.token_ttl_secs)?;
    info!(email = %config.admin_email, ttl_secs = config.token_ttl_secs, "admin logged in");
    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
