//! Identity and access.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id credential hashing
//! - [`auth::jwt`](crate::auth::jwt) - HS256 bearer token issue and verification
//! - [`auth::middleware`](crate::auth::middleware) - Authorization gate, Axum middleware and extractor
//! - [`auth::service`](crate::auth::service) - Registration, login and dummy login
//!
//! # Roles
//!
//! There are exactly two roles, `client` and `moderator`, and they are not
//! ordered. A route gated on one role rejects the other.
//!
//! ```ignore
//! use house_service::auth::middleware::{require_role, RoleRequirement};
//!
//! let moderator_routes = Router::new()
//!     .route("/house/create", post(create_house))
//!     .route_layer(middleware::from_fn_with_state(
//!         RoleRequirement::only(gate, Role::Moderator),
//!         require_role,
//!     ));
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"  # env var holding the signing key (>= 32 bytes)
//! token_ttl_secs = 10800
//! issuer = "house-service"
//! dummy_login_enabled = false
//! ```

/// Token issue and verification.
pub mod jwt;
/// Authorization gate and request plumbing.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Account flows.
pub mod service;
