use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Bound every request by a fixed ceiling. On expiry the downstream future
/// is dropped and 504 is returned; writes already handed to the store are
/// not recalled.
pub async fn request_timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("Request to {} exceeded {:?}", path, limit);
            ApiError::gateway_timeout("request timed out").into_response()
        }
    }
}
