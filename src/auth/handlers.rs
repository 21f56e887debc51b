use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{AuthData, LoginRequest, RegisterRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    services,
};
use crate::{
    errors::ApiError, extract::Json, response::Envelope, state::AppState, users::dto::UserData,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Envelope<AuthData>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let data = services::register(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(Envelope::success("User registered successfully", data)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthData>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let data = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(Envelope::success("Login successful", data)))
}

#[instrument(skip(state))]
pub async fn verify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let user = services::current_user(state.users.as_ref(), user_id).await?;
    Ok(Json(Envelope::success("Token is valid", UserData { user })))
}
