pub mod auth;
pub mod extract;
pub mod response;
pub mod role;

pub use auth::{require_session, AuthUser, SESSION_COOKIE};
pub use extract::ApiJson;
pub use response::{ApiResponse, ApiResult};
pub use role::{require_role, Authorized, RoleGate};
