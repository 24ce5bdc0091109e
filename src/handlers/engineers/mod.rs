// handlers/engineers/mod.rs - Engineer collection and resource handlers
//
// Collection routes run behind the basic auth gate. Resource routes also run
// behind the resolver, which loads the `{username}` record into the request
// extensions before the handler is called.

pub mod create; // POST /engineers
pub mod delete; // DELETE /engineers/:username
pub mod list; // GET /engineers
pub mod show; // GET /engineers/:username
pub mod update; // PUT /engineers/:username

pub use create::engineer_create;
pub use delete::engineer_delete;
pub use list::engineer_list;
pub use show::engineer_show;
pub use update::engineer_update;

use crate::error::ApiError;

/// Resource handler reached without a resolved engineer
fn content_not_found() -> ApiError {
    ApiError::not_found("content not found")
}
