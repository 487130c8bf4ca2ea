//! History API 适配与全局事件绑定
//!
//! 所有对 window.history 的操作都集中在此模块。

use voyage::platform::{HistoryAdapter, Location};
use voyage::router::LinkClick;
use voyage::{NavigateOptions, Router};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlAnchorElement, MouseEvent};

fn history() -> Option<web_sys::History> {
    web_sys::window()?.history().ok()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

impl HistoryAdapter for BrowserHistory {
    fn location(&self) -> Location {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Location::parse("/");
        };
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let search = location.search().unwrap_or_default();
        Location::parse(&format!("{}{}", path, search))
    }

    fn push(&self, url: &str) {
        if let Some(history) = history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }

    fn replace(&self, url: &str) {
        if let Some(history) = history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }

    fn back(&self) {
        if let Some(history) = history() {
            let _ = history.back();
        }
    }

    fn forward(&self) {
        if let Some(history) = history() {
            let _ = history.forward();
        }
    }
}

/// 从点击事件中找出锚点
fn link_click(event: &MouseEvent) -> Option<LinkClick> {
    if event.default_prevented() {
        return None;
    }
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let anchor = target
        .closest("a[href]")
        .ok()??
        .dyn_into::<HtmlAnchorElement>()
        .ok()?;
    let origin = web_sys::window()?.location().origin().ok()?;

    Some(LinkClick {
        href: anchor.get_attribute("href").unwrap_or_default(),
        path: format!("{}{}", anchor.pathname(), anchor.search()),
        same_origin: anchor.origin() == origin,
        target: Some(anchor.target()).filter(|t| !t.is_empty()),
        download: anchor.has_attribute("download"),
        button: event.button(),
        modifier: event.ctrl_key() || event.meta_key() || event.shift_key() || event.alt_key(),
    })
}

/// 监听 popstate 与全局链接点击，把它们交给路由
pub fn bind_router(router: &Router) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let popstate_router = router.clone();
    let on_popstate = Closure::<dyn Fn()>::new(move || {
        let router = popstate_router.clone();
        spawn_local(async move {
            router.on_popstate().await;
        });
    });
    let _ = window.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref());

    let click_router = router.clone();
    let on_click = Closure::<dyn Fn(MouseEvent)>::new(move |event: MouseEvent| {
        let Some(click) = link_click(&event) else {
            return;
        };
        if !click_router.should_intercept(&click) {
            return;
        }
        event.prevent_default();
        let router = click_router.clone();
        spawn_local(async move {
            router
                .navigate_href(&click.path, NavigateOptions::default())
                .await;
        });
    });
    if let Some(document) = window.document() {
        let _ = document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
    }

    // 泄漏闭包以保持监听器存活
    on_popstate.forget();
    on_click.forget();
}
