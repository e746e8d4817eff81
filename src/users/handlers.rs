use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::PublicUser, extractors::CurrentUser, handlers::is_valid_email, repo::User},
    error::ApiError,
    state::AppState,
};

use super::dto::UpdateUserRequest;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users", patch(update_me))
}

/// The guard already resolved the caller's row, so this is a pure echo.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::Validation("invalid email".into()));
        }
    }

    // Target row is always the authenticated identity; a duplicate email
    // surfaces through the unique constraint as 409.
    let updated = User::update_profile(
        &state.db,
        user.id,
        payload.email.as_deref(),
        payload.first_name.as_deref(),
        payload.last_name.as_deref(),
    )
    .await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(PublicUser::from(updated)))
}
