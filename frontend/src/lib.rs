//! Voyage 前端应用
//!
//! - `api`: 旅游后端的强类型客户端
//! - `views`: 页面视图（HTML 字符串）
//! - `pages`: 路由表
//! - `web`: 浏览器适配层，实现核心库定义的宿主 trait

mod api;
mod config;
mod logger;
mod pages;
mod views;

#[cfg(test)]
mod testing;

pub use api::TravelApi;
pub use config::AppConfig;

// 浏览器原生 API 适配模块
// 直接基于 web_sys 实现 voyage::platform 中的各个 trait。
#[cfg(target_arch = "wasm32")]
pub(crate) mod web {
    mod dom;
    mod history;
    mod http;
    mod timer;

    pub use dom::{DomContainer, SpinnerIndicator, ToastNotifier, enquiry_binding};
    pub use history::{BrowserHistory, bind_router};
    pub use http::FetchTransport;
    pub use timer::BrowserScheduler;

    use crate::config::{AppConfig, CONFIG_ELEMENT_ID};

    /// 读取页面内嵌的配置；缺失或格式错误时使用默认值
    pub fn read_config() -> AppConfig {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|e| e.text_content())
            .unwrap_or_default();
        AppConfig::from_json(&text).unwrap_or_else(|e| {
            log::warn!("invalid #{} config, using defaults: {}", CONFIG_ELEMENT_ID, e);
            AppConfig::default()
        })
    }
}

/// 应用入口：读取配置，组装请求层与路由，注册页面并渲染当前地址
#[cfg(target_arch = "wasm32")]
pub fn start() {
    use std::rc::Rc;
    use voyage::platform::Scheduler;
    use voyage::{RequestClient, Router};

    logger::init(log::LevelFilter::Info);
    let config = web::read_config();
    log::set_max_level(config.log_level());

    let Some(container) = web::DomContainer::query(&config.router.container) else {
        log::error!("mount point {} not found", config.router.container);
        return;
    };

    let scheduler: Rc<dyn Scheduler> = Rc::new(web::BrowserScheduler);
    let requests = RequestClient::builder(
        config.request.clone(),
        Rc::new(web::FetchTransport),
        scheduler.clone(),
    )
    .notifier(Rc::new(web::ToastNotifier))
    .loading_indicator(Rc::new(web::SpinnerIndicator::new()))
    .build();

    let mut router_config = config.router;
    if router_config.not_found_path.is_none() {
        router_config.not_found_path = Some(pages::NOT_FOUND_PATH.to_string());
    }
    let router = Router::builder(
        router_config,
        Rc::new(container),
        Rc::new(web::BrowserHistory),
        scheduler,
    )
    .request_client(requests.clone())
    .build();

    if let Err(e) = pages::register(&router, &TravelApi::new(requests)) {
        log::error!("failed to register pages: {}", e);
        return;
    }

    web::bind_router(&router);
    wasm_bindgen_futures::spawn_local(async move {
        router.init().await;
    });
}
