// handlers/engineers/create.rs - POST /engineers handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::database::{abort, Engineer, EngineerTemplate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// POST /engineers - Create a profile.
///
/// Usernames are reserved forever: a name held by an active or a
/// soft-deleted record is refused with 409. A failed insert is rolled back
/// and reported; it never reaches commit.
pub async fn engineer_create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    payload: Result<Json<EngineerTemplate>, JsonRejection>,
) -> ApiResult<Engineer> {
    let Json(template) = payload?;

    let username = template.username().to_string();
    if username.is_empty() {
        return Err(ApiError::bad_request("username can't be empty"));
    }

    if state.store.get(&username).await?.is_some() {
        return Err(ApiError::conflict("username already exists"));
    }

    // Deleted accounts keep their username
    if state.store.get_unscoped(&username).await?.is_some() {
        return Err(ApiError::conflict("username already exists"));
    }

    let mut engineer = Engineer::from(template);
    let mut session = state.store.begin().await?;

    if let Err(e) = session.insert(&mut engineer).await {
        return Err(abort(session, e).await.into());
    }
    session.commit().await?;

    tracing::info!("Created engineer '{}' (by {})", engineer.username, actor.username);
    Ok(ApiResponse::created(engineer))
}
