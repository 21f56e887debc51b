use tracing::warn;
use uuid::Uuid;

use super::{dto::ProfilePatch, model::User, repo::UserStore};
use crate::errors::ApiError;

pub async fn read_profile(store: &dyn UserStore, user_id: Uuid) -> Result<User, ApiError> {
    store.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "profile requested for missing user");
        ApiError::NotFound
    })
}

/// Validates the present fields and merges them into the stored profile.
pub async fn update_profile(
    store: &dyn UserStore,
    user_id: Uuid,
    patch: ProfilePatch,
) -> Result<User, ApiError> {
    let changes = patch.validate().map_err(|errors| {
        warn!(%user_id, count = errors.len(), "profile update failed validation");
        ApiError::Validation(errors)
    })?;

    store
        .update_profile(user_id, &changes)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "profile update for missing user");
            ApiError::NotFound
        })
}
