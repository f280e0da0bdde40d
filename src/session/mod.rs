//! Stored credential, token claims, and the session-expired signal.
//!
//! ARCHITECTURE
//! ============
//! The API client and the expiry watcher share one `TokenStore`. Either can
//! end the session: the client when the service answers 401, the watcher
//! when the token's `exp` claim passes. Both report through `SessionEvents`,
//! a broadcast channel the login surface subscribes to. Dropping a
//! `SessionSubscription` unsubscribes it.
//!
//! TRADE-OFFS
//! ==========
//! Claims are decoded without verifying the signature. The client only uses
//! `exp` to log out early; the service remains the authority on validity.

pub mod watcher;

use std::sync::{Arc, PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub use watcher::spawn_expiry_watcher;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("token is not a JWT (expected three dot-separated segments)")]
    Malformed,
    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),
    #[error("token payload is not valid JSON: {0}")]
    Payload(String),
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Shared slot holding the current bearer token, if any.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Remove the token. Returns the token that was stored.
    pub fn clear(&self) -> Option<String> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Remove the token only if it is still `expected`. Returns whether it was
    /// removed; a token stored since `expected` was read is left in place.
    pub fn clear_if(&self, expected: &str) -> bool {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.as_deref() != Some(expected) {
            return false;
        }
        *slot = None;
        true
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

// =============================================================================
// CLAIMS
// =============================================================================

/// The JWT claims the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Expiry, unix seconds.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Decode the payload segment of a JWT.
///
/// # Errors
///
/// Returns an error if the token does not have three segments or the
/// payload is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(SessionError::Malformed);
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::Encoding(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionError::Payload(e.to_string()))
}

/// Whether `token` should be treated as expired at `now` (unix seconds).
///
/// Undecodable tokens count as expired. Tokens without `exp` never expire.
#[must_use]
pub fn is_expired(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp.is_some_and(|exp| exp <= now),
        Err(e) => {
            warn!(error = %e, "stored token could not be decoded; treating as expired");
            true
        }
    }
}

/// Current wall-clock time in unix seconds.
#[must_use]
pub fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

// =============================================================================
// EVENTS
// =============================================================================

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// The service rejected a request with HTTP 401.
    Unauthorized,
    /// The token's `exp` claim passed.
    TokenExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Expired { reason: ExpiryReason },
}

/// Process-wide session signal. Clones share one channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Start receiving events. Drop the subscription to unsubscribe.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription { rx: self.tx.subscribe() }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn notify_expired(&self, reason: ExpiryReason) {
        info!(?reason, "session expired");
        if self.tx.send(SessionEvent::Expired { reason }).is_err() {
            debug!("no session subscribers");
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to [`SessionEvents`].
#[derive(Debug)]
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Wait for the next event. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for a pending event.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
