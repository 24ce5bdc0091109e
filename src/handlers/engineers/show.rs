// handlers/engineers/show.rs - GET /engineers/:username handler

use axum::Extension;

use crate::database::Engineer;
use crate::middleware::{ApiResponse, ApiResult, ResolvedEngineer};

use super::content_not_found;

pub async fn engineer_show(resolved: Option<Extension<ResolvedEngineer>>) -> ApiResult<Engineer> {
    let Extension(ResolvedEngineer(engineer)) = resolved.ok_or_else(content_not_found)?;
    Ok(ApiResponse::success(engineer))
}
