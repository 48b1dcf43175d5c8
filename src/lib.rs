//! # house-service
//!
//! HTTP API for housing developments. Moderators register houses and move
//! flats through moderation; clients add flats and see the approved ones.
//! Access is decided per request from a stateless HS256 bearer token that
//! carries one of two roles.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `house-service` binary
//! 2. **As a library** - Build an [`AppState`] and mount [`app`] in your own
//!    Axum server, or use the services directly
//!
//! ### Library Example
//!
//! ```rust,ignore
//! use house_service::{app, db::DatabaseProvider, utils::clock::system_clock};
//! use house_service::{AppState, HouseServiceConfig};
//!
//! let config = HouseServiceConfig::default();
//! let stores = DatabaseProvider::Memory.create_stores().await?;
//! let state = AppState::new(&config, b"a-secret-of-at-least-thirty-two-bytes", stores, system_clock());
//!
//! let router = app(state);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`api`] - REST handlers, routes and the OpenAPI document
//! - [`auth`] - Password hashing, tokens, the authorization gate and account flows
//! - [`housing`] - Houses and the flat status machine
//! - [`db`] - Store traits with in-memory and libsql backends
//! - [`types`] - Domain records, DTOs and errors
//! - [`utils`] - Configuration, logging and the injectable clock

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Identity and access.
pub mod auth;
/// Command-line arguments.
pub mod cli;
/// Store traits and backends.
pub mod db;
/// Houses and flats.
pub mod housing;
/// Core types (records, requests, responses, errors).
pub mod types;
/// Configuration, logging and clock utilities.
pub mod utils;

pub use db::{DatabaseProvider, Stores};
pub use types::{AppError, Result};
pub use utils::toml_config::HouseServiceConfig;

use crate::auth::jwt::TokenService;
use crate::auth::middleware::AuthorizationGate;
use crate::auth::service::AuthService;
use crate::housing::{FlatStatusMachine, HouseService};
use crate::utils::clock::SharedClock;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub auth_service: Arc<AuthService>,
    /// Bearer token checks for gated routes
    pub gate: AuthorizationGate,
    /// House registration
    pub houses: Arc<HouseService>,
    /// Flat lifecycle
    pub flats: Arc<FlatStatusMachine>,
}

impl AppState {
    /// Wires services over the given stores.
    ///
    /// `secret` is the HS256 signing key; the config supplies issuer, token
    /// lifetime and the dummy login switch.
    pub fn new(
        config: &HouseServiceConfig,
        secret: &[u8],
        stores: Stores,
        clock: SharedClock,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            secret,
            config.auth.issuer.clone(),
            config.token_ttl(),
            clock.clone(),
        ));

        let auth_service = Arc::new(AuthService::new(
            stores.credentials.clone(),
            tokens.clone(),
            config.auth.dummy_login_enabled,
        ));
        let houses = Arc::new(HouseService::new(stores.houses.clone(), clock.clone()));
        let flats = Arc::new(FlatStatusMachine::new(stores.flats, stores.houses, clock));

        Self {
            auth_service,
            gate: AuthorizationGate::new(tokens),
            houses,
            flats,
        }
    }
}

/// Full application router: health probe, API routes and request tracing.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(api::routes::create_router(state.gate.clone()));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
