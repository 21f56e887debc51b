use axum::{extract::State, routing::get, Router};
use tracing::{info, instrument};

use super::{
    dto::{UpdateProfileRequest, UserData},
    services,
};
use crate::{
    auth::extractors::AuthUser, errors::ApiError, extract::Json, response::Envelope,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let user = services::read_profile(state.users.as_ref(), user_id).await?;
    Ok(Json(Envelope::success(
        "Profile retrieved successfully",
        UserData { user },
    )))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let user = services::update_profile(state.users.as_ref(), user_id, payload.profile).await?;
    info!(%user_id, "profile updated");
    Ok(Json(Envelope::success(
        "Profile updated successfully",
        UserData { user },
    )))
}
