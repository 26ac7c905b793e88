//! Permission Definitions
//!
//! 按角色授予的默认权限。权限字符串格式为 `模块:操作`，支持 `模块:*` 通配。
//!
//! ## 设计原则
//! - 会话查看与操作按模块授权
//! - 桌台、菜单、餐厅设置仅经理可用
//! - 创建餐厅仅平台管理员 (`all`) 可用

use shared::models::StaffRole;

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[
    "sessions:read",   // 查看活动会话、历史、详情
    "sessions:manage", // 结束/暂停/恢复/取消会话，响应呼叫
    "orders:manage",   // 推进订单状态
    "tables:manage",   // 桌台管理与二维码重置
    "menu:manage",     // 菜单管理
    "settings:manage", // 餐厅税率、服务费、币种
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理角色默认权限
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "sessions:*",
    "orders:*",
    "tables:manage",
    "menu:manage",
    "settings:manage",
];

/// 普通员工默认权限
pub const DEFAULT_STAFF_PERMISSIONS: &[&str] = &["sessions:read", "sessions:manage", "orders:manage"];

/// Get permissions for a role
pub fn get_default_permissions(role: StaffRole) -> Vec<String> {
    let perms = match role {
        StaffRole::Admin => DEFAULT_ADMIN_PERMISSIONS,
        StaffRole::Manager => DEFAULT_MANAGER_PERMISSIONS,
        StaffRole::Staff => DEFAULT_STAFF_PERMISSIONS,
    };
    perms.iter().map(|s| s.to_string()).collect()
}
