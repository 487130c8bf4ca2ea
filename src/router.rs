//! 客户端路由
//!
//! 导航流程：
//! 1. 去掉 base 前缀，按注册顺序匹配路由（首个命中者胜出）
//! 2. 未命中 -> `not_found_path` 或内置未找到模板
//! 3. `before_navigation` 钩子可中止导航
//! 4. 显示加载模板，生成内容（渲染函数 / 模板 / 组件 / 远程 HTML）
//! 5. 成功：（可选动画）替换内容，更新当前路由，触发 after 钩子
//!    失败：渲染错误模板，当前路由保持不变
//!
//! 所有错误都在导航内部消化，不会传播给调用方。

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{NavigationError, RouterError};
use crate::platform::{ContainerAdapter, HistoryAdapter, Location, Scheduler};
use crate::request::{RequestClient, RequestOptions};

mod config;
mod handler;
mod pattern;
mod state;

pub use config::{
    AfterNavigation, AnimationConfig, BeforeNavigation, DEFAULT_ANIMATION_MS,
    DEFAULT_LOADING_TEMPLATE, ErrorTemplate, OverlapPolicy, RouterConfig, RouterHooks,
    escape_html, not_found_html,
};
pub use handler::{AfterRender, Component, Content, Fragment, Handler, RenderFn, RenderFuture};
pub use pattern::{RoutePattern, substitute};
pub use state::{
    LinkClick, NavigateOptions, NavigationOutcome, NavigationPhase, Params, Query, RouteMatch,
    parse_query,
};


struct Route {
    pattern: RoutePattern,
    handler: Rc<Handler>,
}

#[derive(Default)]
struct RouterState {
    routes: Vec<Route>,
    current: Option<RouteMatch>,
    phase: NavigationPhase,
    /// 是否已有导航成功写入过内容（首次导航不做动画）
    rendered_once: bool,
    /// 每次导航开始时递增
    generation: u64,
}

struct RouterInner {
    config: RouterConfig,
    container: Rc<dyn ContainerAdapter>,
    history: Rc<dyn HistoryAdapter>,
    scheduler: Rc<dyn Scheduler>,
    requests: Option<RequestClient>,
    state: RefCell<RouterState>,
}

/// 路由
///
/// 克隆体共享同一份路由表与导航状态。
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

pub struct RouterBuilder {
    config: RouterConfig,
    container: Rc<dyn ContainerAdapter>,
    history: Rc<dyn HistoryAdapter>,
    scheduler: Rc<dyn Scheduler>,
    requests: Option<RequestClient>,
}

impl RouterBuilder {
    /// 远程 HTML 路由使用的请求客户端
    pub fn request_client(mut self, client: RequestClient) -> Self {
        self.requests = Some(client);
        self
    }

    pub fn build(self) -> Router {
        Router {
            inner: Rc::new(RouterInner {
                config: self.config,
                container: self.container,
                history: self.history,
                scheduler: self.scheduler,
                requests: self.requests,
                state: RefCell::new(RouterState::default()),
            }),
        }
    }
}

impl Router {
    pub fn builder(
        config: RouterConfig,
        container: Rc<dyn ContainerAdapter>,
        history: Rc<dyn HistoryAdapter>,
        scheduler: Rc<dyn Scheduler>,
    ) -> RouterBuilder {
        RouterBuilder {
            config,
            container,
            history,
            scheduler,
            requests: None,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// 注册路由；匹配按注册顺序进行，不做去重或冲突检查
    pub fn route(&self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        let pattern = RoutePattern::parse(pattern)?;
        log::debug!("route registered: {}", pattern.as_str());
        self.inner.state.borrow_mut().routes.push(Route {
            pattern,
            handler: Rc::new(handler),
        });
        Ok(())
    }

    pub fn current_route(&self) -> Option<RouteMatch> {
        self.inner.state.borrow().current.clone()
    }

    /// 最近一次导航所处的阶段
    pub fn phase(&self) -> NavigationPhase {
        self.inner.state.borrow().phase
    }

    // =========================================================
    // 导航入口
    // =========================================================

    /// 处理当前地址（首次加载）
    ///
    /// popstate 与链接点击的监听由宿主适配层负责，事件到达后分别调用
    /// [`Router::on_popstate`] 与 [`Router::should_intercept`] + [`Router::navigate_href`]。
    pub async fn init(&self) -> NavigationOutcome {
        let location = self.inner.history.location();
        log::info!(
            "router started at {} with {} routes",
            location.href(),
            self.inner.state.borrow().routes.len()
        );
        self.handle(location).await
    }

    /// 导航到应用内路径（自动加上 base 前缀）
    pub async fn navigate(&self, path: &str, options: NavigateOptions) -> NavigationOutcome {
        let href = self.with_base(path);
        self.navigate_href(&href, options).await
    }

    /// 导航到完整的 `pathname?query`（已含 base 前缀，例如被拦截的链接）
    pub async fn navigate_href(&self, href: &str, options: NavigateOptions) -> NavigationOutcome {
        let target = Location::parse(href);
        let current = self.inner.history.location();
        let same = target.href() == current.href();

        if same && !options.force {
            log::debug!("already at {}", target.href());
            return NavigationOutcome::Unchanged;
        }
        // 强制刷新当前地址时不再堆叠一条相同的历史记录
        if options.replace || same {
            self.inner.history.replace(&target.href());
        } else {
            self.inner.history.push(&target.href());
        }
        self.handle(target).await
    }

    /// 浏览器前进/后退后调用
    pub async fn on_popstate(&self) -> NavigationOutcome {
        let location = self.inner.history.location();
        self.handle(location).await
    }

    /// 后续导航由宿主的 popstate 事件驱动
    pub fn back(&self) {
        self.inner.history.back();
    }

    pub fn forward(&self) {
        self.inner.history.forward();
    }

    /// 重新渲染当前地址
    pub async fn refresh(&self) -> NavigationOutcome {
        let location = self.inner.history.location();
        self.handle(location).await
    }

    /// 链接是否由路由接管；设置了 base 时只接管其下的路径
    pub fn should_intercept(&self, click: &LinkClick) -> bool {
        if !click.should_intercept() {
            return false;
        }
        // 指向当前页面的片段链接只做页内跳转
        if click.href.contains('#')
            && Location::parse(&click.path).href() == self.inner.history.location().href()
        {
            return false;
        }
        let base = self.base();
        base.is_empty() || strip_prefix_segment(&Location::parse(&click.path).path, base).is_some()
    }

    // =========================================================
    // 导航处理
    // =========================================================

    async fn handle(&self, location: Location) -> NavigationOutcome {
        let generation = self.begin();
        let path = self.strip_base(&location.path);
        log::debug!("navigating to {}", path);

        let resolved = match self.resolve(&path, parse_query(&location.query)) {
            Some(found) => Some(found),
            None => self.fallback(&path),
        };
        let Some((handler, to)) = resolved else {
            log::warn!("no route matches {}", path);
            self.inner
                .container
                .set_html(&not_found_html(&path, &self.inner.config.default_route));
            self.finish(generation);
            return NavigationOutcome::NotFound;
        };

        if let Some(before) = &self.inner.config.hooks.before_navigation {
            let from = self.current_route();
            if !before(from.as_ref(), &to) {
                log::debug!("navigation to {} cancelled by hook", to.path);
                self.finish(generation);
                return NavigationOutcome::Aborted;
            }
        }

        if handler.show_loading {
            self.inner
                .container
                .set_html(&self.inner.config.loading_template);
        }
        self.set_phase(generation, NavigationPhase::Loading);

        let content = self.produce(&handler, &to).await;
        if self.is_superseded(generation) {
            log::debug!("navigation to {} superseded", to.path);
            return NavigationOutcome::Superseded;
        }

        let html = match content {
            Ok(html) => html,
            Err(err) => {
                log::error!("navigation to {} failed: {}", to.path, err);
                let html = self
                    .inner
                    .config
                    .error_template
                    .render(err.message(), &self.inner.config.default_route);
                self.inner.container.set_html(&html);
                self.finish(generation);
                return NavigationOutcome::Failed;
            }
        };

        self.set_phase(generation, NavigationPhase::Rendering);
        self.swap(&html).await;
        if self.is_superseded(generation) {
            log::debug!("navigation to {} superseded", to.path);
            return NavigationOutcome::Superseded;
        }
        if matches!(handler.content, Content::Remote { .. }) {
            self.inner.container.reexecute_scripts();
        }

        {
            let mut state = self.inner.state.borrow_mut();
            state.current = Some(to.clone());
            state.rendered_once = true;
        }
        if self.inner.config.scroll_to_top {
            self.inner.container.scroll_to_top();
        }
        if let Some(after) = &handler.after_render {
            after(self.inner.container.as_ref(), &to.params, &to.query);
        }
        if let Some(after) = &self.inner.config.hooks.after_navigation {
            after(&to);
        }
        self.finish(generation);
        NavigationOutcome::Rendered
    }

    /// 按注册顺序查找首个匹配的路由
    fn resolve(&self, path: &str, query: Query) -> Option<(Rc<Handler>, RouteMatch)> {
        let state = self.inner.state.borrow();
        state.routes.iter().find_map(|route| {
            let params = route.pattern.captures(path)?;
            Some((
                route.handler.clone(),
                RouteMatch {
                    pattern: route.pattern.as_str().to_string(),
                    path: path.to_string(),
                    params,
                    query: query.clone(),
                },
            ))
        })
    }

    /// 转到 `not_found_path`；它本身也无法匹配时返回 None
    fn fallback(&self, missed: &str) -> Option<(Rc<Handler>, RouteMatch)> {
        let not_found = self.inner.config.not_found_path.as_deref()?;
        let location = Location::parse(not_found);
        if location.path == missed {
            return None;
        }
        log::warn!("no route matches {}, showing {}", missed, not_found);
        self.inner.history.replace(&self.with_base(&location.href()));
        self.resolve(&location.path, parse_query(&location.query))
    }

    async fn produce(
        &self,
        handler: &Handler,
        route: &RouteMatch,
    ) -> Result<String, NavigationError> {
        match &handler.content {
            Content::Render(render) => render(route.clone()).await,
            Content::Template(html) => Ok(html.clone()),
            Content::Component(component) => {
                let fragment = Fragment::new();
                component.mount(&fragment, route).await?;
                Ok(fragment.into_html())
            }
            Content::Remote { url, no_cache } => {
                let requests = self.inner.requests.as_ref().ok_or_else(|| {
                    NavigationError::new("remote content needs a request client")
                })?;
                let url = substitute(url, &route.params);
                let mut options = RequestOptions::new().header("Accept", "text/html");
                if *no_cache {
                    options = options.no_cache();
                }
                Ok(requests.request(&url, options).await?.into_text())
            }
        }
    }

    /// 淡出 -> 替换 -> 淡入；首次渲染或关闭动画时直接替换
    async fn swap(&self, html: &str) {
        let animation = &self.inner.config.animation;
        let container = &self.inner.container;
        let animate = animation.enabled && self.inner.state.borrow().rendered_once;
        if !animate {
            container.set_html(html);
            return;
        }

        container.add_class(&animation.out_class);
        self.inner.scheduler.sleep(animation.duration()).await;
        container.set_html(html);
        container.remove_class(&animation.out_class);
        container.add_class(&animation.in_class);
        self.inner.scheduler.sleep(animation.duration()).await;
        container.remove_class(&animation.in_class);
    }

    // =========================================================
    // 状态机
    // =========================================================

    fn begin(&self) -> u64 {
        let mut state = self.inner.state.borrow_mut();
        state.generation += 1;
        state.phase = NavigationPhase::Resolving;
        state.generation
    }

    /// 只有最近一次导航能推进阶段
    fn set_phase(&self, generation: u64, phase: NavigationPhase) {
        let mut state = self.inner.state.borrow_mut();
        if state.generation == generation {
            state.phase = phase;
        }
    }

    fn finish(&self, generation: u64) {
        self.set_phase(generation, NavigationPhase::Idle);
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.inner.config.overlap == OverlapPolicy::LatestOnly
            && self.inner.state.borrow().generation != generation
    }

    // =========================================================
    // base 前缀
    // =========================================================

    /// 规范化后的 base 前缀（无结尾斜杠，未配置时为空串）；生成站内链接时拼在路径前
    pub fn base(&self) -> &str {
        self.inner.config.base_url.trim_end_matches('/')
    }

    fn strip_base(&self, path: &str) -> String {
        let base = self.base();
        let stripped = if base.is_empty() {
            path
        } else {
            strip_prefix_segment(path, base).unwrap_or(path)
        };
        if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        }
    }

    fn with_base(&self, path: &str) -> String {
        let base = self.base();
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// `/app/tour` 去掉 `/app` 得到 `/tour`；`/application` 不算 `/app` 的子路径
fn strip_prefix_segment<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(base)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}
