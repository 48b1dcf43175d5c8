use crate::auth::middleware::{require_role, AuthorizationGate, RoleRequirement};
use crate::types::Role;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(gate: AuthorizationGate) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/dummyLogin", get(crate::api::handlers::auth::dummy_login))
        .route("/register", post(crate::api::handlers::auth::register))
        .route("/login", post(crate::api::handlers::auth::login));

    // Either role may list flats; what they see is filtered by role.
    let authenticated_routes = Router::new()
        .route(
            "/house/{id}",
            get(crate::api::handlers::houses::list_flats),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleRequirement::authenticated(gate.clone()),
            require_role,
        ));

    let client_routes = Router::new()
        .route(
            "/flat/create",
            post(crate::api::handlers::flats::create_flat),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleRequirement::only(gate.clone(), Role::Client),
            require_role,
        ));

    let moderator_routes = Router::new()
        .route(
            "/house/create",
            post(crate::api::handlers::houses::create_house),
        )
        .route(
            "/flat/update",
            post(crate::api::handlers::flats::update_flat),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleRequirement::only(gate, Role::Moderator),
            require_role,
        ));

    public_routes
        .merge(authenticated_routes)
        .merge(client_routes)
        .merge(moderator_routes)
}
