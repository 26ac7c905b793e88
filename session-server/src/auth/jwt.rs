//! JWT 令牌服务
//!
//! 处理员工 access / refresh 令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use shared::models::StaffAccount;
use thiserror::Error;

use crate::sessions::AccessScope;

/// access 令牌类型
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// refresh 令牌类型
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// access 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// refresh 令牌过期时间 (分钟)
    pub refresh_expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// release 构建必须设置 `JWT_SECRET`，debug 构建缺省时生成临时密钥。
    pub fn from_env() -> Result<Self, JwtError> {
        Ok(Self {
            secret: load_jwt_secret()?,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            refresh_expiration_minutes: std::env::var("JWT_REFRESH_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10080), // 默认 7 天
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "session-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "dining-clients".to_string()),
        })
    }

    /// 使用随机密钥 (测试)
    pub fn with_random_secret() -> Self {
        Self {
            secret: generate_secure_printable_jwt_secret(),
            expiration_minutes: 60,
            refresh_expiration_minutes: 10080,
            issuer: "session-server".to_string(),
            audience: "dining-clients".to_string(),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 员工 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 所属餐厅 (平台管理员为空)
    #[serde(default)]
    pub restaurant_id: Option<i64>,
    /// 令牌类型: access | refresh
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型错误: 需要 {expected}")]
    WrongTokenType { expected: &'static str },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // 随机数生成失败时退回时间种子, 仅开发环境使用
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        return format!("SessionServerDevelopmentKey-{:032x}", seed);
    }
    bytes
        .iter()
        .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
        .collect()
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "⚠️  JWT_SECRET not set! Generating secure temporary key for development."
                );
                Ok(generate_secure_printable_jwt_secret())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为员工生成 access 令牌
    pub fn generate_access_token(
        &self,
        account: &StaffAccount,
        permissions: &[String],
    ) -> Result<String, JwtError> {
        self.generate(
            account,
            permissions,
            TOKEN_TYPE_ACCESS,
            self.config.expiration_minutes,
        )
    }

    /// 为员工生成 refresh 令牌
    pub fn generate_refresh_token(
        &self,
        account: &StaffAccount,
        permissions: &[String],
    ) -> Result<String, JwtError> {
        self.generate(
            account,
            permissions,
            TOKEN_TYPE_REFRESH,
            self.config.refresh_expiration_minutes,
        )
    }

    fn generate(
        &self,
        account: &StaffAccount,
        permissions: &[String],
        token_type: &str,
        lifetime_minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(lifetime_minutes);

        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            role: account.role.as_str().to_string(),
            permissions: permissions.join(","),
            restaurant_id: account.restaurant_id,
            token_type: token_type.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌 (不检查类型)
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 验证 access 令牌
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TOKEN_TYPE_ACCESS)
    }

    /// 验证 refresh 令牌
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TOKEN_TYPE_REFRESH)
    }

    fn validate_typed(&self, token: &str, expected: &'static str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// access 令牌有效期 (秒)
    pub fn access_expires_in_secs(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}

/// 当前员工上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求处理函数
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 员工 ID
    pub id: i64,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 权限列表
    pub permissions: Vec<String>,
    /// 所属餐厅
    pub restaurant_id: Option<i64>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("non-numeric subject: {}", claims.sub)))?;
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
            permissions,
            restaurant_id: claims.restaurant_id,
        })
    }
}

impl CurrentUser {
    /// 是否管理员
    ///
    /// 管理员角色 (`role == "admin"`) 拥有所有权限
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// 检查是否拥有指定权限
    ///
    /// 支持通配符匹配：
    /// - `"sessions:*"` 匹配 `"sessions:read"`, `"sessions:manage"`
    /// - `"all"` 表示拥有所有权限
    ///
    /// # 规则
    ///
    /// 1. 管理员拥有所有权限
    /// 2. 权限列表包含 `"all"` 则拥有所有权限
    /// 3. 精确匹配或前缀匹配 (`:*` 通配符)
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        if self.permissions.iter().any(|p| p == "all") {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            if let Some(prefix) = p.strip_suffix(":*") {
                permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':'))
            } else {
                false
            }
        })
    }

    /// 可操作的餐厅范围
    ///
    /// `all` 权限 (含管理员) 覆盖所有餐厅；其余员工只能操作所属餐厅。
    pub fn scope(&self) -> AccessScope {
        if self.is_admin() || self.permissions.iter().any(|p| p == "all") {
            return AccessScope::All;
        }
        match self.restaurant_id {
            Some(id) => AccessScope::Restaurant(id),
            None => AccessScope::Nothing,
        }
    }

    /// 请求未指定餐厅时使用的默认餐厅
    pub fn default_restaurant(&self) -> Option<i64> {
        self.restaurant_id
    }

    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            role: self.role.clone(),
            permissions: self.permissions.clone(),
            restaurant_id: self.restaurant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StaffRole;

    fn account(role: StaffRole, restaurant_id: Option<i64>) -> StaffAccount {
        StaffAccount {
            id: 42,
            username: "maria".to_string(),
            password_hash: String::new(),
            role,
            restaurant_id,
            is_active: true,
            created_at: 0,
        }
    }

    fn user(role: &str, permissions: &[&str], restaurant_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "u".to_string(),
            role: role.to_string(),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            restaurant_id,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::with_config(JwtConfig::with_random_secret());
        let perms = vec!["sessions:read".to_string(), "orders:manage".to_string()];

        let token = service
            .generate_access_token(&account(StaffRole::Staff, Some(7)), &perms)
            .expect("Failed to generate test token");
        let claims = service
            .validate_access_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "staff");
        assert_eq!(claims.restaurant_id, Some(7));

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.permissions, perms);
    }

    #[test]
    fn test_token_type_enforced() {
        let service = JwtService::with_config(JwtConfig::with_random_secret());
        let refresh = service
            .generate_refresh_token(&account(StaffRole::Manager, Some(1)), &[])
            .unwrap();

        assert!(matches!(
            service.validate_access_token(&refresh),
            Err(JwtError::WrongTokenType { expected: "access" })
        ));
        assert!(service.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issuer = JwtService::with_config(JwtConfig::with_random_secret());
        let verifier = JwtService::with_config(JwtConfig::with_random_secret());
        let token = issuer
            .generate_access_token(&account(StaffRole::Staff, Some(1)), &[])
            .unwrap();
        assert!(verifier.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = JwtConfig::with_random_secret();
        config.expiration_minutes = -5;
        let service = JwtService::with_config(config);
        let token = service
            .generate_access_token(&account(StaffRole::Staff, Some(1)), &[])
            .unwrap();
        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_permission_wildcards() {
        let manager = user("manager", &["sessions:*", "menu:manage"], Some(1));
        assert!(manager.has_permission("sessions:read"));
        assert!(manager.has_permission("sessions:manage"));
        assert!(manager.has_permission("menu:manage"));
        assert!(!manager.has_permission("settings:manage"));
        assert!(!manager.has_permission("sessionsx:read"));

        let staff = user("staff", &["all"], None);
        assert!(staff.has_permission("anything:at_all"));

        let admin = user("admin", &[], None);
        assert!(admin.has_permission("tables:manage"));
    }

    #[test]
    fn test_scope() {
        assert_eq!(user("admin", &[], None).scope(), AccessScope::All);
        assert_eq!(user("staff", &["all"], Some(3)).scope(), AccessScope::All);
        assert_eq!(
            user("staff", &["sessions:read"], Some(3)).scope(),
            AccessScope::Restaurant(3)
        );
        assert_eq!(user("staff", &[], None).scope(), AccessScope::Nothing);
    }
}
