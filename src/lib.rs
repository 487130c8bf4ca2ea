//! 旅游站点前端核心：客户端路由 + 请求层
//!
//! 两个组件互相独立，都只依赖 [`platform`] 中的宿主抽象：
//! - [`request::RequestClient`]：GET/POST/PUT/DELETE、GET 缓存、超时、加载指示器、错误钩子
//! - [`router::Router`]：路径匹配、浏览历史、过渡动画、生命周期钩子
//!
//! 路由只有在处理器选择拉取远程 HTML 时才会用到请求层。

pub mod error;
pub mod platform;
pub mod request;
pub mod router;

pub use error::{NavigationError, RequestError, RouterError, TransportError};
pub use request::{LoadHtmlOptions, Payload, RequestClient, RequestConfig, RequestOptions};
pub use router::{Handler, NavigateOptions, NavigationOutcome, RouteMatch, Router, RouterConfig};
