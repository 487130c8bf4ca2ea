//! DOM 适配：挂载点、通知、加载指示器、表单

use std::time::Duration;

use js_sys::Array;
use voyage::platform::{ContainerAdapter, FormSource, FormValue, LoadingIndicator, Notifier};
use voyage::request::{RequestClient, RequestOptions};
use voyage::router::{Params, Query};
use voyage_shared::HttpMethod;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, FormData, HtmlFormElement};

const SPINNER_ID: &str = "voyage-spinner";
const TOAST_DURATION: Duration = Duration::from_secs(4);

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

// =========================================================
// 挂载点
// =========================================================

pub struct DomContainer {
    element: Element,
}

impl DomContainer {
    pub fn query(selector: &str) -> Option<Self> {
        let element = document()?.query_selector(selector).ok()??;
        Some(Self { element })
    }
}

/// 克隆 `<script>`（属性与脚本体）并原地替换，使浏览器执行它
fn replace_script(document: &Document, old: &Element) -> Result<(), JsValue> {
    let fresh = document.create_element("script")?;
    let attributes = old.attributes();
    for i in 0..attributes.length() {
        if let Some(attr) = attributes.item(i) {
            fresh.set_attribute(&attr.name(), &attr.value())?;
        }
    }
    fresh.set_text_content(old.text_content().as_deref());
    if let Some(parent) = old.parent_node() {
        parent.replace_child(&fresh, old)?;
    }
    Ok(())
}

impl ContainerAdapter for DomContainer {
    fn set_html(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn html(&self) -> String {
        self.element.inner_html()
    }

    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn scroll_to_top(&self) {
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
    }

    fn reexecute_scripts(&self) {
        let (Some(document), Ok(scripts)) =
            (document(), self.element.query_selector_all("script"))
        else {
            return;
        };
        for i in 0..scripts.length() {
            let Some(old) = scripts.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if let Err(e) = replace_script(&document, &old) {
                log::warn!("failed to re-run script: {:?}", e);
            }
        }
    }
}

// =========================================================
// 通知与加载指示器
// =========================================================

/// 右上角的短暂提示
#[derive(Debug, Clone, Copy, Default)]
pub struct ToastNotifier;

impl Notifier for ToastNotifier {
    fn notify(&self, message: &str) {
        let Some(document) = document() else { return };
        let Some(body) = document.body() else { return };
        let Ok(toast) = document.create_element("div") else {
            return;
        };
        toast.set_class_name("toast");
        let _ = toast.set_attribute("role", "alert");
        toast.set_text_content(Some(message));
        if body.append_child(&toast).is_err() {
            return;
        }
        spawn_local(async move {
            gloo_timers::future::sleep(TOAST_DURATION).await;
            toast.remove();
        });
    }
}

/// 全局加载遮罩：`#voyage-spinner`，不存在时自动创建
pub struct SpinnerIndicator {
    element: Option<Element>,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        let element = document().and_then(|document| {
            if let Some(existing) = document.get_element_by_id(SPINNER_ID) {
                return Some(existing);
            }
            let spinner = document.create_element("div").ok()?;
            spinner.set_id(SPINNER_ID);
            spinner.set_class_name("spinner-overlay");
            document.body()?.append_child(&spinner).ok()?;
            Some(spinner)
        });
        Self { element }
    }
}

impl LoadingIndicator for SpinnerIndicator {
    fn show(&self) {
        if let Some(element) = &self.element {
            let _ = element.class_list().add_1("visible");
        }
    }

    fn hide(&self) {
        if let Some(element) = &self.element {
            let _ = element.class_list().remove_1("visible");
        }
    }
}

// =========================================================
// 表单
// =========================================================

#[derive(Clone)]
pub struct DomForm(pub HtmlFormElement);

impl FormSource for DomForm {
    fn method(&self) -> Option<HttpMethod> {
        self.0
            .get_attribute("method")
            .and_then(|method| HttpMethod::parse(&method))
    }

    fn action(&self) -> Option<String> {
        self.0.get_attribute("action").filter(|a| !a.is_empty())
    }

    /// 只收集文本字段；文件字段需要异步读取，这里跳过
    fn fields(&self) -> Vec<(String, FormValue)> {
        let Ok(data) = FormData::new_with_form(&self.0) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let entry: Array = entry.dyn_into().ok()?;
                let name = entry.get(0).as_string()?;
                match entry.get(1).as_string() {
                    Some(text) => Some((name, FormValue::Text(text))),
                    None => {
                        log::warn!("skipping file field {}", name);
                        None
                    }
                }
            })
            .collect()
    }
}

/// 线路页渲染后接管咨询表单的提交
pub fn enquiry_binding(
    requests: RequestClient,
) -> impl Fn(&dyn ContainerAdapter, &Params, &Query) + 'static {
    move |_container: &dyn ContainerAdapter, _params: &Params, _query: &Query| {
        let Some(form) = document()
            .and_then(|d| d.get_element_by_id("enquiry"))
            .and_then(|e| e.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };

        let requests = requests.clone();
        let target = form.clone();
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| {
            event.prevent_default();
            let form = DomForm(target.clone());
            let requests = requests.clone();
            spawn_local(async move {
                if requests
                    .submit_form(&form, None, RequestOptions::new())
                    .await
                    .is_ok()
                {
                    ToastNotifier.notify("Thanks! We will get back to you soon.");
                    form.0.reset();
                }
            });
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());

        // 泄漏闭包以保持监听器存活；表单随页面替换一起销毁
        closure.forget();
    }
}
