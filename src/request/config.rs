use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

// =========================================================
// 默认值
// =========================================================

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CACHE_DURATION_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_LOADING_DELAY_MS: u64 = 300;

/// 请求层配置
///
/// 字段名与页面内嵌的 JSON 配置保持一致（camelCase，时长单位为毫秒）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestConfig {
    /// 拼接在每个相对路径前的前缀
    pub base_url: String,
    /// 默认请求头；单次调用的同名请求头优先
    pub default_headers: HashMap<String, String>,
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    #[serde(rename = "cacheDuration")]
    pub cache_duration_ms: u64,
    pub enable_cache: bool,
    pub loading_indicator: LoadingIndicatorConfig,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_headers: HashMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_duration_ms: DEFAULT_CACHE_DURATION_MS,
            enable_cache: true,
            loading_indicator: LoadingIndicatorConfig::default(),
        }
    }
}

impl RequestConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.cache_duration_ms)
    }

    /// 将相对路径拼接为完整 URL（即缓存键）
    ///
    /// 绝对 URL 原样返回；base 与 path 之间只保留一个 `/`。
    pub fn resolve_url(&self, path: &str) -> String {
        if self.base_url.is_empty() || path.starts_with("http://") || path.starts_with("https://")
        {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadingIndicatorConfig {
    pub show: bool,
    #[serde(rename = "delay")]
    pub delay_ms: u64,
}

impl Default for LoadingIndicatorConfig {
    fn default() -> Self {
        Self {
            show: true,
            delay_ms: DEFAULT_LOADING_DELAY_MS,
        }
    }
}

impl LoadingIndicatorConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
