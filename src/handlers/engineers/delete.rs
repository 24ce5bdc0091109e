// handlers/engineers/delete.rs - DELETE /engineers/:username handler

use axum::{extract::State, http::StatusCode, Extension};

use crate::database::abort;
use crate::error::ApiError;
use crate::middleware::{AuthUser, ResolvedEngineer};
use crate::server::AppState;

use super::content_not_found;

/// DELETE /engineers/:username - Soft delete. The row stays behind with
/// `deleted_at` set, so the username can never be created again.
pub async fn engineer_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    resolved: Option<Extension<ResolvedEngineer>>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Extension(ResolvedEngineer(mut engineer)) = resolved.ok_or_else(content_not_found)?;

    let mut session = state.store.begin().await?;
    if let Err(e) = session.delete(&mut engineer).await {
        return Err(abort(session, e).await.into());
    }
    session.commit().await?;

    tracing::info!("Deleted engineer '{}' (by {})", engineer.username, actor.username);
    Ok((StatusCode::OK, "deleted successfully"))
}
