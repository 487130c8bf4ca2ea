//! 宿主环境抽象层
//!
//! 请求层与路由只依赖这里定义的 trait，不直接触碰浏览器全局对象：
//! - 浏览器实现位于 `voyage-frontend` 的 `web` 模块
//! - 原生实现位于 `native` 子模块 (tokio / reqwest)
//!
//! 宿主是单线程协作式调度，因此异步 trait 统一使用 `?Send`。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use voyage_shared::{HttpMethod, Timestamp};

use crate::error::TransportError;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(test)]
pub(crate) mod mock;

// =========================================================
// 传输层 (Transport)
// =========================================================

/// multipart 表单字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormValue {
    /// 序列化为 JSON 时使用的文本形式（文件只保留文件名）
    pub fn as_text(&self) -> &str {
        match self {
            FormValue::Text(text) => text,
            FormValue::File { file_name, .. } => file_name,
        }
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Form(Vec<(String, FormValue)>),
}

impl RequestBody {
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(RequestBody::Json)
    }
}

/// 发往请求原语的完整请求（URL 已拼接 base）
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

/// 请求原语返回的原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 请求原语
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: RawRequest) -> Result<RawResponse, TransportError>;
}

// =========================================================
// 时钟与定时器
// =========================================================

#[async_trait(?Send)]
pub trait Scheduler {
    /// 当前时间
    fn now(&self) -> Timestamp;
    /// 延迟完成；不阻塞调用线程
    async fn sleep(&self, duration: Duration);
}

// =========================================================
// 界面协作者
// =========================================================

/// 用户可见的短暂通知（默认错误处理使用）
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// 全局共享的加载指示器
pub trait LoadingIndicator {
    fn show(&self);
    fn hide(&self);
}

/// 可替换内容的挂载点
pub trait ContainerAdapter {
    fn set_html(&self, html: &str);
    fn html(&self) -> String;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    fn scroll_to_top(&self) {}

    /// 通过 innerHTML 写入的 `<script>` 不会自动执行，需要克隆替换后重新执行
    fn reexecute_scripts(&self) {}
}

/// 表单数据来源
pub trait FormSource {
    /// 表单声明的 method
    fn method(&self) -> Option<HttpMethod>;
    /// 表单声明的 action
    fn action(&self) -> Option<String>;
    fn fields(&self) -> Vec<(String, FormValue)>;
}

// =========================================================
// 浏览历史
// =========================================================

/// 当前地址（不含 origin 与 hash）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    /// 不含前导 `?`
    pub query: String,
}

impl Location {
    /// 从 `path?query#hash` 形式的字符串解析
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            path: if path.is_empty() { "/" } else { path }.to_string(),
            query: query.to_string(),
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

pub trait HistoryAdapter {
    fn location(&self) -> Location;
    fn push(&self, url: &str);
    fn replace(&self, url: &str);
    fn back(&self);
    fn forward(&self);
}
