//! HTTP 中间件
//!
//! - [`logging`] - 请求日志
//! - [`envelope`] - 统一错误信封

pub mod envelope;
pub mod logging;

pub use envelope::error_envelope;
pub use logging::{expose_user, logging_middleware};
