use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::Deserialize;

use super::RouteMatch;

pub const DEFAULT_LOADING_TEMPLATE: &str =
    r#"<div class="route-loading"><div class="spinner" role="status"></div></div>"#;
pub const DEFAULT_ANIMATION_MS: u64 = 300;

/// 导航前钩子：返回 false 则中止导航
pub type BeforeNavigation = Rc<dyn Fn(Option<&RouteMatch>, &RouteMatch) -> bool>;
pub type AfterNavigation = Rc<dyn Fn(&RouteMatch)>;

/// 错误模板：由错误消息与默认路由生成标记
#[derive(Clone)]
pub struct ErrorTemplate(Rc<dyn Fn(&str, &str) -> String>);

impl ErrorTemplate {
    pub fn new(render: impl Fn(&str, &str) -> String + 'static) -> Self {
        Self(Rc::new(render))
    }

    pub fn render(&self, message: &str, default_route: &str) -> String {
        (self.0)(message, default_route)
    }
}

impl Default for ErrorTemplate {
    fn default() -> Self {
        Self::new(|message, default_route| {
            format!(
                r#"<div class="route-error"><h2>Something went wrong</h2><p>{}</p><a href="{}">Back to home</a></div>"#,
                escape_html(message),
                escape_html(default_route)
            )
        })
    }
}

impl fmt::Debug for ErrorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorTemplate(..)")
    }
}

/// 导航前后的全局钩子
#[derive(Clone, Default)]
pub struct RouterHooks {
    pub before_navigation: Option<BeforeNavigation>,
    pub after_navigation: Option<AfterNavigation>,
}

impl fmt::Debug for RouterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterHooks")
            .field("before_navigation", &self.before_navigation.is_some())
            .field("after_navigation", &self.after_navigation.is_some())
            .finish()
    }
}

/// 过渡动画
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    pub enabled: bool,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub out_class: String,
    pub in_class: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: DEFAULT_ANIMATION_MS,
            out_class: "fade-out".to_string(),
            in_class: "fade-in".to_string(),
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// 并发导航的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlapPolicy {
    /// 不取消也不排队，最后完成的导航写入最终内容
    #[default]
    LastWriterWins,
    /// 被更新导航取代的导航放弃后续的 DOM 写入与钩子
    LatestOnly,
}

/// 路由配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// 所有路由共享的路径前缀
    pub base_url: String,
    /// 挂载点选择器（由浏览器适配层解析）
    pub container: String,
    pub default_route: String,
    pub not_found_path: Option<String>,
    pub loading_template: String,
    pub scroll_to_top: bool,
    pub animation: AnimationConfig,
    pub overlap: OverlapPolicy,
    #[serde(skip)]
    pub error_template: ErrorTemplate,
    #[serde(skip)]
    pub hooks: RouterHooks,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            container: "#app".to_string(),
            default_route: "/".to_string(),
            not_found_path: None,
            loading_template: DEFAULT_LOADING_TEMPLATE.to_string(),
            scroll_to_top: true,
            animation: AnimationConfig::default(),
            overlap: OverlapPolicy::default(),
            error_template: ErrorTemplate::default(),
            hooks: RouterHooks::default(),
        }
    }
}

impl RouterConfig {
    pub fn before_navigation(
        mut self,
        hook: impl Fn(Option<&RouteMatch>, &RouteMatch) -> bool + 'static,
    ) -> Self {
        self.hooks.before_navigation = Some(Rc::new(hook));
        self
    }

    pub fn after_navigation(mut self, hook: impl Fn(&RouteMatch) + 'static) -> Self {
        self.hooks.after_navigation = Some(Rc::new(hook));
        self
    }

    pub fn error_template(mut self, template: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.error_template = ErrorTemplate::new(template);
        self
    }

    pub fn without_animation(mut self) -> Self {
        self.animation.enabled = false;
        self
    }
}

/// 内置的未找到页面
pub fn not_found_html(path: &str, default_route: &str) -> String {
    format!(
        r#"<div class="route-not-found"><h2>Page not found</h2><p>No page matches <code>{}</code>.</p><a href="{}">Back to home</a></div>"#,
        escape_html(path),
        escape_html(default_route)
    )
}

/// 转义插入 HTML 文本节点/属性的字符串
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
