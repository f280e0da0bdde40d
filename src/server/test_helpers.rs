use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::app;
use super::state::AppState;
use crate::config::ServerConfig;

pub const TEST_EMAIL: &str = "admin@lot.test";
pub const TEST_PASSWORD: &str = "hunter22";
pub const TEST_SECRET: &str = "test-secret";

#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        admin_email: TEST_EMAIL.into(),
        admin_password: TEST_PASSWORD.into(),
        jwt_secret: TEST_SECRET.into(),
        token_ttl_secs: 3600,
        max_upload_bytes: 1024 * 1024,
        seed_demo: false,
    }
}

#[must_use]
pub fn test_app_state() -> AppState {
    AppState::new(test_config())
}

/// Serve `state` on an ephemeral localhost port.
pub async fn spawn_server(state: AppState) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("test server failed");
    });
    (addr, handle)
}
