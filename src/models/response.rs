//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 服务版本号
pub const SERVICE_VERSION: &str = "1.0.0";

/// 当前 UTC 时间（RFC 3339）
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// 统一 API 响应结构
///
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - timestamp: 响应时间戳（UTC）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self::with_message(data, "Success")
    }

    /// 创建带自定义消息的成功响应
    pub fn with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_string(),
            timestamp: now_rfc3339(),
        }
    }

    /// 创建错误响应
    ///
    /// # 参数
    /// - message: 错误信息
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: now_rfc3339(),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "stock-api".to_string(),
            timestamp: now_rfc3339(),
            version: SERVICE_VERSION.to_string(),
        }
    }
}
