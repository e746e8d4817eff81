use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::CurrentUser, error::ApiError, state::AppState,
};

use super::{
    dto::{CreateBookmarkRequest, UpdateBookmarkRequest},
    repo::Bookmark,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
        .route(
            "/bookmarks/:id",
            get(get_bookmark).patch(update_bookmark).delete(delete_bookmark),
        )
}

/// The ownership gate for single-item operations. A missing row and a row
/// owned by someone else collapse into the same rejection, so probing ids
/// reveals nothing about other users' bookmarks.
fn ensure_owner(bookmark: Option<Bookmark>, user_id: i64) -> Result<Bookmark, ApiError> {
    match bookmark {
        Some(b) if b.user_id == user_id => Ok(b),
        Some(b) => {
            warn!(bookmark_id = %b.id, owner = %b.user_id, requester = %user_id, "foreign bookmark access");
            Err(ApiError::Forbidden)
        }
        None => Err(ApiError::Forbidden),
    }
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = Bookmark::list_by_user(&state.db, user.id).await?;
    Ok(Json(bookmarks))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Bookmark>), ApiError> {
    let title = payload.title.trim();
    let link = payload.link.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("title must not be empty".into()));
    }
    if link.is_empty() {
        return Err(ApiError::Validation("link must not be empty".into()));
    }

    // Owner comes from the authenticated identity, never from the payload
    let bookmark =
        Bookmark::create(&state.db, user.id, title, link, payload.description.as_deref()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/bookmarks/{}", bookmark.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    info!(bookmark_id = %bookmark.id, "bookmark created");
    Ok((StatusCode::CREATED, headers, Json(bookmark)))
}

#[instrument(skip_all, fields(user_id = %user.id, bookmark_id = %id))]
pub async fn get_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Bookmark>, ApiError> {
    let bookmark = ensure_owner(Bookmark::find_by_id(&state.db, id).await?, user.id)?;
    Ok(Json(bookmark))
}

#[instrument(skip_all, fields(user_id = %user.id, bookmark_id = %id))]
pub async fn update_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBookmarkRequest>,
) -> Result<Json<Bookmark>, ApiError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::Validation("title must not be empty".into()));
    }
    if payload.link.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(ApiError::Validation("link must not be empty".into()));
    }

    ensure_owner(Bookmark::find_by_id(&state.db, id).await?, user.id)?;

    let bookmark = Bookmark::update(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.link.as_deref(),
        payload.description.as_deref(),
    )
    .await?;

    info!(bookmark_id = %bookmark.id, "bookmark updated");
    Ok(Json(bookmark))
}

#[instrument(skip_all, fields(user_id = %user.id, bookmark_id = %id))]
pub async fn delete_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(Bookmark::find_by_id(&state.db, id).await?, user.id)?;

    Bookmark::delete(&state.db, id).await?;

    info!(bookmark_id = %id, "bookmark deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn bookmark_owned_by(user_id: i64) -> Bookmark {
        Bookmark {
            id: 1,
            user_id,
            title: "t".into(),
            link: "l".into(),
            description: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn owner_passes_the_gate() {
        let b = ensure_owner(Some(bookmark_owned_by(7)), 7).expect("owner allowed");
        assert_eq!(b.user_id, 7);
    }

    #[test]
    fn foreign_bookmark_is_forbidden() {
        let err = ensure_owner(Some(bookmark_owned_by(7)), 8).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn missing_bookmark_is_forbidden() {
        let err = ensure_owner(None, 7).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn missing_and_foreign_are_indistinguishable() {
        let foreign = ensure_owner(Some(bookmark_owned_by(7)), 8).unwrap_err();
        let missing = ensure_owner(None, 8).unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }
}
