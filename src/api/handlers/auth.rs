use crate::{
    types::{
        DummyLoginQuery, LoginRequest, RegisterRequest, RegisterResponse, Result, TokenResponse,
    },
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

/// Issue a token for a role without credentials (development only)
#[utoipa::path(
    get,
    path = "/dummyLogin",
    params(DummyLoginQuery),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unknown user type"),
        (status = 403, description = "Dummy login disabled")
    ),
    tag = "auth"
)]
pub async fn dummy_login(
    State(state): State<AppState>,
    query: std::result::Result<Query<DummyLoginQuery>, QueryRejection>,
) -> Result<Json<TokenResponse>> {
    let Query(query) = query?;
    let token = state.auth_service.dummy_login(query.user_type)?;

    Ok(Json(TokenResponse { token }))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(payload) = payload?;

    let user = state
        .auth_service
        .register(&payload.email, &payload.password, payload.user_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id: user.id }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}
