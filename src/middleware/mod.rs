pub mod basic_auth;
pub mod client_ip;
pub mod resolve_engineer;
pub mod response;
pub mod recover;
pub mod timeout;

pub use basic_auth::{basic_auth_middleware, AuthUser, BasicCredentials};
pub use client_ip::{client_ip_middleware, ClientIp};
pub use resolve_engineer::{resolve_engineer_middleware, ResolvedEngineer};
pub use response::{ApiResponse, ApiResult};
pub use recover::recover_from_panic;
pub use timeout::request_timeout_middleware;
