use thiserror::Error;

// =========================================================
// 传输层错误
// =========================================================

/// 请求原语本身失败（网络不可达、连接被重置等），尚未拿到任何 HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// =========================================================
// 请求层错误
// =========================================================

/// 请求层对外暴露的统一错误
///
/// 所有变体的 `Display` 输出即为面向用户的提示文本。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// 非 2xx 响应；message 依次取自 JSON 错误体、原始文本、`Error <status>`
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Network(String),
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    Build(String),
    /// 2xx 响应，但业务信封声明失败 (`success: false`)
    #[error("{0}")]
    Rejected(String),
}

impl RequestError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout(_))
    }
}

impl From<TransportError> for RequestError {
    fn from(e: TransportError) -> Self {
        RequestError::Network(e.message)
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Decode(e.to_string())
    }
}

// =========================================================
// 路由错误
// =========================================================

/// 生成路由内容时的任何失败（渲染函数报错、远程 HTML 拉取失败等）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NavigationError {
    message: String,
}

impl NavigationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RequestError> for NavigationError {
    fn from(e: RequestError) -> Self {
        NavigationError::new(e.message())
    }
}

impl From<String> for NavigationError {
    fn from(message: String) -> Self {
        NavigationError::new(message)
    }
}

/// 路由注册失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
