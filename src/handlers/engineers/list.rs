// handlers/engineers/list.rs - GET /engineers handler

use axum::extract::{rejection::QueryRejection, Query, State};

use crate::database::{Engineer, EngineerFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// GET /engineers - All active engineers, oldest first.
///
/// Optional `city`, `division` and `position` query parameters narrow the
/// list by exact match.
pub async fn engineer_list(
    State(state): State<AppState>,
    query: Result<Query<EngineerFilter>, QueryRejection>,
) -> ApiResult<Vec<Engineer>> {
    let Query(filter) = query?;
    let engineers = state.store.find(&filter).await?;
    Ok(ApiResponse::success(engineers))
}
