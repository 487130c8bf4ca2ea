use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use super::{Params, Query, RouteMatch};
use crate::error::NavigationError;
use crate::platform::ContainerAdapter;

pub type RenderFuture = LocalBoxFuture<'static, Result<String, NavigationError>>;
pub type RenderFn = Rc<dyn Fn(RouteMatch) -> RenderFuture>;
/// 渲染完成后的回调：挂载点、路径参数、查询参数
pub type AfterRender = Rc<dyn Fn(&dyn ContainerAdapter, &Params, &Query)>;

/// 可挂载组件
#[async_trait(?Send)]
pub trait Component {
    /// 渲染到给定挂载点；路由随后读取挂载点中的标记
    async fn mount(
        &self,
        container: &dyn ContainerAdapter,
        route: &RouteMatch,
    ) -> Result<(), NavigationError>;
}

/// 路由内容来源
#[derive(Clone)]
pub enum Content {
    /// 渲染函数（同步或异步）
    Render(RenderFn),
    /// 静态模板
    Template(String),
    /// 可挂载组件
    Component(Rc<dyn Component>),
    /// 远程 HTML；`url` 中的 `:param` 会被替换
    Remote { url: String, no_cache: bool },
}

/// 路由处理器
#[derive(Clone)]
pub struct Handler {
    pub content: Content,
    /// 生成内容期间是否先显示加载模板
    pub show_loading: bool,
    pub after_render: Option<AfterRender>,
}

impl Handler {
    pub fn new(content: Content) -> Self {
        Self {
            content,
            show_loading: true,
            after_render: None,
        }
    }

    pub fn render<F, Fut>(render: F) -> Self
    where
        F: Fn(RouteMatch) -> Fut + 'static,
        Fut: Future<Output = Result<String, NavigationError>> + 'static,
    {
        Self::new(Content::Render(Rc::new(move |route| render(route).boxed_local())))
    }

    pub fn render_sync<F>(render: F) -> Self
    where
        F: Fn(&RouteMatch) -> Result<String, NavigationError> + 'static,
    {
        Self::new(Content::Render(Rc::new(move |route| {
            futures::future::ready(render(&route)).boxed_local()
        })))
    }

    pub fn template(html: impl Into<String>) -> Self {
        Self::new(Content::Template(html.into()))
    }

    pub fn component(component: impl Component + 'static) -> Self {
        Self::new(Content::Component(Rc::new(component)))
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::new(Content::Remote {
            url: url.into(),
            no_cache: false,
        })
    }

    /// 仅对远程内容生效
    pub fn no_cache(mut self) -> Self {
        if let Content::Remote { no_cache, .. } = &mut self.content {
            *no_cache = true;
        }
        self
    }

    pub fn without_loading(mut self) -> Self {
        self.show_loading = false;
        self
    }

    pub fn after_render(
        mut self,
        callback: impl Fn(&dyn ContainerAdapter, &Params, &Query) + 'static,
    ) -> Self {
        self.after_render = Some(Rc::new(callback));
        self
    }
}

// =========================================================
// Fragment
// =========================================================

/// 内存中的挂载点，组件先渲染到这里，再整体写入真正的容器
#[derive(Debug, Default)]
pub struct Fragment {
    html: RefCell<String>,
    classes: RefCell<Vec<String>>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_html(self) -> String {
        self.html.into_inner()
    }
}

impl ContainerAdapter for Fragment {
    fn set_html(&self, html: &str) {
        *self.html.borrow_mut() = html.to_string();
    }

    fn html(&self) -> String {
        self.html.borrow().clone()
    }

    fn add_class(&self, class: &str) {
        self.classes.borrow_mut().push(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }
}
