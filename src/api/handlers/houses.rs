use crate::{
    auth::middleware::AuthUser,
    types::{CreateHouseRequest, FlatsResponse, House, Result},
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

/// Create a house (moderators only)
#[utoipa::path(
    post,
    path = "/house/create",
    request_body = CreateHouseRequest,
    responses(
        (status = 200, description = "House created", body = House),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a moderator"),
        (status = 409, description = "Address already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "houses"
)]
pub async fn create_house(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateHouseRequest>, JsonRejection>,
) -> Result<Json<House>> {
    let Json(payload) = payload?;
    let house = state.houses.create_house(payload).await?;

    Ok(Json(house))
}

/// List the flats of a house visible to the caller's role
#[utoipa::path(
    get,
    path = "/house/{id}",
    params(("id" = i64, Path, description = "House id")),
    responses(
        (status = 200, description = "Flats visible to the caller", body = FlatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "House not found")
    ),
    security(("bearer_auth" = [])),
    tag = "houses"
)]
pub async fn list_flats(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    house_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<FlatsResponse>> {
    let Path(house_id) = house_id?;
    let flats = state.flats.list_visible(house_id, claims.sub).await?;

    Ok(Json(FlatsResponse { flats }))
}
