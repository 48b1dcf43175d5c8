//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use house_service::{
    app,
    utils::clock::{system_clock, SharedClock},
    AppState, DatabaseProvider, HouseServiceConfig,
};

pub const TEST_SECRET: &[u8] = b"test_jwt_secret_key_for_testing_only_32b";

/// Config for tests: in-memory storage, dummy login switchable.
pub fn test_config(dummy_login_enabled: bool) -> HouseServiceConfig {
    let mut config = HouseServiceConfig::default();
    config.database.url = ":memory:".to_string();
    config.auth.dummy_login_enabled = dummy_login_enabled;
    config
}

pub async fn create_test_state(dummy_login_enabled: bool, clock: SharedClock) -> AppState {
    let stores = DatabaseProvider::Memory
        .create_stores()
        .await
        .expect("Failed to create in-memory stores");

    AppState::new(
        &test_config(dummy_login_enabled),
        TEST_SECRET,
        stores,
        clock,
    )
}

/// Test server over the full router with the in-memory backend.
pub async fn create_test_server() -> TestServer {
    create_test_server_with(false, system_clock()).await
}

pub async fn create_test_server_with(dummy_login_enabled: bool, clock: SharedClock) -> TestServer {
    let state = create_test_state(dummy_login_enabled, clock).await;
    TestServer::new(app(state)).expect("Failed to create test server")
}
