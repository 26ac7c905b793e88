//! 认证授权模块
//!
//! 提供员工 JWT 认证、权限管理、访客令牌提取和中间件：
//! - [`JwtService`] - JWT 令牌服务 (access / refresh)
//! - [`CurrentUser`] - 当前员工上下文
//! - [`GuestSession`] - 访客令牌提取器
//! - [`require_auth`] - 认证中间件
//! - [`require_permission`] - 权限检查中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use extractor::GuestSession;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
pub use password::{hash_password, verify_password};
