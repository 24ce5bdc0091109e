// handlers/engineers/update.rs - PUT /engineers/:username handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::database::{abort, Engineer, EngineerTemplate};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ResolvedEngineer};
use crate::server::AppState;

use super::content_not_found;

/// PUT /engineers/:username - Partial profile update.
///
/// Non-empty `firstname`, `lastname`, `city` and `division` overwrite the
/// stored values. Identity always comes from the path. The write only lands
/// if the version loaded by the resolver is still current.
pub async fn engineer_update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    resolved: Option<Extension<ResolvedEngineer>>,
    payload: Result<Json<EngineerTemplate>, JsonRejection>,
) -> ApiResult<Engineer> {
    let Extension(ResolvedEngineer(mut engineer)) = resolved.ok_or_else(content_not_found)?;
    let Json(patch) = payload?;

    engineer.apply_patch(patch);

    let mut session = state.store.begin().await?;
    if let Err(e) = session.update(&mut engineer).await {
        return Err(abort(session, e).await.into());
    }
    session.commit().await?;

    tracing::info!(
        "Updated engineer '{}' to version {} (by {})",
        engineer.username,
        engineer.version,
        actor.username
    );
    Ok(ApiResponse::success(engineer))
}
