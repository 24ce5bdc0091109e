use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::{Engineer, StoreError};
use crate::error::ApiError;
use crate::server::AppState;

/// Active engineer named by the `{username}` path segment, loaded once per
/// request and shared by the read, update and delete handlers.
#[derive(Clone, Debug)]
pub struct ResolvedEngineer(pub Engineer);

/// Middleware that loads the engineer named in the path before the handler
/// runs. Unknown or soft-deleted usernames stop here with 404.
pub async fn resolve_engineer_middleware(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Path(username) = path?;
    let engineer = state
        .store
        .get(&username)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Engineer '{}' not found in active scope", username);
            StoreError::NotFound(username.clone())
        })?;

    request.extensions_mut().insert(ResolvedEngineer(engineer));

    Ok(next.run(request).await)
}
