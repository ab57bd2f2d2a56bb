pub mod auth;
pub mod permission;
pub mod response;

pub use auth::{auth_gate, AuthUser};
pub use permission::{require_roles_permission, require_table_permission, require_users_permission};
pub use response::{ApiResponse, ApiResult};
