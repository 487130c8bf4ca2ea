use std::collections::HashMap;

/// 按声明顺序排列的路径参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new(values: Vec<(String, String)>) -> Self {
        Self(values)
    }

    /// 同名参数出现多次时取最后一个
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 扁平的查询参数表；重复的键以最后一次出现为准
pub type Query = HashMap<String, String>;

pub fn parse_query(query: &str) -> Query {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// 一次成功匹配的路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// 注册时的模式
    pub pattern: String,
    /// 去掉 base 前缀后的路径
    pub path: String,
    pub params: Params,
    pub query: Query,
}

/// 导航状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPhase {
    #[default]
    Idle,
    Resolving,
    Loading,
    Rendering,
}

/// 一次导航的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// 内容已写入，`current_route` 已更新
    Rendered,
    /// 渲染了错误模板
    Failed,
    /// 渲染了内置的未找到模板
    NotFound,
    /// 被 `before_navigation` 钩子拦截
    Aborted,
    /// 目标与当前地址相同，未做任何事
    Unchanged,
    /// 被更新的导航取代，放弃了剩余的写入 (`OverlapPolicy::LatestOnly`)
    Superseded,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigateOptions {
    /// 使用 replaceState 而非 pushState
    pub replace: bool,
    /// 即使目标与当前地址相同也重新导航
    pub force: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self {
            replace: true,
            force: false,
        }
    }

    pub fn force() -> Self {
        Self {
            replace: false,
            force: true,
        }
    }
}

/// 一次锚点点击的相关信息，由浏览器适配层填充
#[derive(Debug, Clone, Default)]
pub struct LinkClick {
    /// `href` 属性原文
    pub href: String,
    /// 解析后的 `pathname + search`
    pub path: String,
    pub same_origin: bool,
    pub target: Option<String>,
    pub download: bool,
    /// 0 为主键
    pub button: i16,
    /// 是否按下 ctrl / meta / shift / alt
    pub modifier: bool,
}

impl LinkClick {
    /// 是否应由路由接管：同源、非纯 hash、非新标签页、非下载、主键且无修饰键
    pub fn should_intercept(&self) -> bool {
        let href = self.href.trim();
        let opens_elsewhere = self
            .target
            .as_deref()
            .is_some_and(|t| !t.is_empty() && !t.eq_ignore_ascii_case("_self"));
        let non_http = ["mailto:", "tel:", "javascript:"]
            .iter()
            .any(|scheme| href.to_ascii_lowercase().starts_with(scheme));

        self.same_origin
            && self.button == 0
            && !self.modifier
            && !self.download
            && !opens_elsewhere
            && !href.is_empty()
            && !href.starts_with('#')
            && !non_http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_last_occurrence_wins() {
        let query = parse_query("?city=Rome&city=Paris&q=old+town");
        assert_eq!(query.get("city").map(String::as_str), Some("Paris"));
        assert_eq!(query.get("q").map(String::as_str), Some("old town"));
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn test_params_duplicate_name_takes_last() {
        let params = Params::new(vec![
            ("id".to_string(), "1".to_string()),
            ("id".to_string(), "2".to_string()),
        ]);
        assert_eq!(params.get("id"), Some("2"));
        assert_eq!(params.len(), 2);
    }

    fn link(href: &str) -> LinkClick {
        LinkClick {
            href: href.to_string(),
            path: href.to_string(),
            same_origin: true,
            ..LinkClick::default()
        }
    }

    #[test]
    fn test_intercepts_plain_same_origin_link() {
        assert!(link("/tour/42").should_intercept());
        let mut self_target = link("/tour/42");
        self_target.target = Some("_self".to_string());
        assert!(self_target.should_intercept());
    }

    #[test]
    fn test_skips_links_the_browser_should_handle() {
        assert!(!link("#reviews").should_intercept());
        assert!(!link("mailto:hi@example.com").should_intercept());

        let mut external = link("https://other.example.com/");
        external.same_origin = false;
        assert!(!external.should_intercept());

        let mut blank = link("/tour/1");
        blank.target = Some("_blank".to_string());
        assert!(!blank.should_intercept());

        let mut modified = link("/tour/1");
        modified.modifier = true;
        assert!(!modified.should_intercept());

        let mut middle = link("/tour/1");
        middle.button = 1;
        assert!(!middle.should_intercept());

        let mut download = link("/brochure.pdf");
        download.download = true;
        assert!(!download.should_intercept());
    }
}
