pub mod auth_service;
pub mod bootstrap;
pub mod permission_service;
pub mod role_service;
pub mod user_service;

pub use auth_service::{AuthError, AuthService, AuthUser, LoginRequest, LoginResponse};
pub use permission_service::PermissionAggregator;
pub use role_service::{CreateRoleRequest, PermissionInput, RoleError, RoleService, UpdateRoleRequest};
pub use user_service::{
    ChangePasswordRequest, CreateUserRequest, UpdateUserRequest, UserError, UserService,
};
