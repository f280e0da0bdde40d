//! Configuration parsed from environment variables.
//!
//! Client and server settings are loaded independently so the CLI can run
//! read-only commands without any server secrets present.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TOKEN_POLL_SECS: u64 = 60;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@showroom.local";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Inventory service base URL, without a trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// How often the expiry watcher inspects the stored token.
    pub token_poll: Duration,
}

impl ClientConfig {
    /// Build client config from environment variables.
    ///
    /// Optional:
    /// - `SHOWROOM_API_URL`: default `http://127.0.0.1:3000`
    /// - `SHOWROOM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SHOWROOM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SHOWROOM_TOKEN_POLL_SECS`: default 60
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("SHOWROOM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self {
            base_url: normalize_base_url(&base_url),
            request_timeout: Duration::from_secs(env_parse(
                "SHOWROOM_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(env_parse(
                "SHOWROOM_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            token_poll: Duration::from_secs(env_parse("SHOWROOM_TOKEN_POLL_SECS", DEFAULT_TOKEN_POLL_SECS).max(1)),
        }
    }

    /// Config pointing at `base_url` with default timeouts.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            token_poll: Duration::from_secs(DEFAULT_TOKEN_POLL_SECS),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }
}

/// Trim whitespace and trailing slashes from a base URL.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub admin_email: String,
    pub admin_password: String,
    /// HMAC key for issued tokens.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub max_upload_bytes: usize,
    /// Populate the inventory with a handful of demo vehicles at startup.
    pub seed_demo: bool,
}

impl ServerConfig {
    /// Build server config from environment variables.
    ///
    /// `ADMIN_PASSWORD` and `JWT_SECRET` fall back to random values when
    /// unset; a warning is logged since nobody can log in without knowing
    /// the password.
    #[must_use]
    pub fn from_env() -> Self {
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; generated a random admin password");
            crate::server::auth::generate_secret()
        });
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| crate::server::auth::generate_secret());

        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_owned()),
            admin_password,
            jwt_secret,
            token_ttl_secs: env_parse("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            seed_demo: env_bool("SEED_DEMO").unwrap_or(false),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
