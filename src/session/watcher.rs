//! Background poller that ends the session when the stored token expires.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::{ExpiryReason, SessionEvents, TokenStore, is_expired};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Inspect the stored token once. Clears it and signals when expired.
///
/// Returns true if the session was ended.
pub fn check_expiry(store: &TokenStore, events: &SessionEvents, now: i64) -> bool {
    let Some(token) = store.get() else {
        return false;
    };
    if !is_expired(&token, now) || !store.clear_if(&token) {
        return false;
    }
    events.notify_expired(ExpiryReason::TokenExpired);
    true
}

/// Spawn the expiry watcher. Abort the returned handle to stop it.
///
/// The watcher keeps running after an expiry so a token stored by a later
/// login is watched too. A zero `period` is raised to one millisecond.
pub fn spawn_expiry_watcher(store: TokenStore, events: SessionEvents, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);
    info!(period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX), "token expiry watcher started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            check_expiry(&store, &events, super::now_unix());
        }
    })
}
