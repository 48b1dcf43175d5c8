use crate::{
    types::{CreateFlatRequest, Flat, Result, UpdateFlatRequest},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

/// Create a flat in an existing house (clients only)
#[utoipa::path(
    post,
    path = "/flat/create",
    request_body = CreateFlatRequest,
    responses(
        (status = 200, description = "Flat created in status `created`", body = Flat),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a client"),
        (status = 404, description = "House not found"),
        (status = 409, description = "Flat number already taken in this house")
    ),
    security(("bearer_auth" = [])),
    tag = "flats"
)]
pub async fn create_flat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateFlatRequest>, JsonRejection>,
) -> Result<Json<Flat>> {
    let Json(payload) = payload?;
    let flat = state.flats.create_flat(payload).await?;

    Ok(Json(flat))
}

/// Move a flat to another moderation status (moderators only)
#[utoipa::path(
    post,
    path = "/flat/update",
    request_body = UpdateFlatRequest,
    responses(
        (status = 200, description = "Flat updated", body = Flat),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a moderator"),
        (status = 404, description = "Flat not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flats"
)]
pub async fn update_flat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateFlatRequest>, JsonRejection>,
) -> Result<Json<Flat>> {
    let Json(payload) = payload?;
    let flat = state
        .flats
        .apply_transition(payload.id, &payload.status)
        .await?;

    Ok(Json(flat))
}
