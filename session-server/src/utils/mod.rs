//! 工具模块 - 通用工具函数
//!
//! # 内容
//!
//! - [`validation`] - 文本长度常量与请求校验
//! - [`logger`] - 日志初始化

pub mod logger;
pub mod validation;

// Re-export error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
