//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and role gating
//!
//! # API Endpoints
//!
//! ## Authentication
//! - `GET /dummyLogin?user_type=` - Token for a role, no credentials (when enabled)
//! - `POST /register` - Register new user
//! - `POST /login` - Login and receive a bearer token
//!
//! ## Houses
//! - `POST /house/create` - Create a house (moderator)
//! - `GET /house/{id}` - Flats of a house, filtered by the caller's role
//!
//! ## Flats
//! - `POST /flat/create` - Create a flat (client)
//! - `POST /flat/update` - Change a flat's moderation status (moderator)
//!
//! ## Health
//! - `GET /health` - Liveness probe
//!
//! # Authentication
//!
//! Gated endpoints require a bearer token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::types::{
    CreateFlatRequest, CreateHouseRequest, Flat, FlatStatus, FlatsResponse, House, LoginRequest,
    RegisterRequest, RegisterResponse, Role, TokenResponse, UpdateFlatRequest,
};

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "House service API",
        description = "Houses, flats and their moderation, with client and moderator roles."
    ),
    paths(
        handlers::auth::dummy_login,
        handlers::auth::register,
        handlers::auth::login,
        handlers::houses::create_house,
        handlers::houses::list_flats,
        handlers::flats::create_flat,
        handlers::flats::update_flat,
    ),
    components(schemas(
        Role,
        FlatStatus,
        House,
        Flat,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        TokenResponse,
        CreateHouseRequest,
        CreateFlatRequest,
        UpdateFlatRequest,
        FlatsResponse,
    )),
    tags(
        (name = "auth", description = "Registration and token issue"),
        (name = "houses", description = "Houses and flat listings"),
        (name = "flats", description = "Flat creation and moderation")
    )
)]
pub struct ApiDoc;
