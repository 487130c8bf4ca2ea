use log::LevelFilter;
use serde::Deserialize;
use voyage::{RequestConfig, RouterConfig};

/// 页面中承载配置 JSON 的 `<script>` 元素 ID
pub const CONFIG_ELEMENT_ID: &str = "voyage-config";

/// 应用配置，读取自页面内嵌的 JSON；缺省字段取默认值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub request: RequestConfig,
    pub router: RouterConfig,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }
}
