// =========================================================
// 测试环境实现 (Mock)
// =========================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use voyage::platform::native::TokioScheduler;
use voyage::platform::{
    ContainerAdapter, HistoryAdapter, Location, RawRequest, RawResponse, Transport,
};
use voyage::{RequestClient, RequestConfig, Router, RouterConfig, TransportError};

/// 按 URL 返回预置响应；未预置的 URL 返回 404
#[derive(Default)]
pub struct StubTransport {
    replies: RefCell<HashMap<String, RawResponse>>,
    requests: RefCell<Vec<RawRequest>>,
}

impl StubTransport {
    pub fn json(&self, url: &str, status: u16, body: serde_json::Value) {
        self.replies.borrow_mut().insert(
            url.to_string(),
            RawResponse {
                status,
                content_type: Some("application/json".to_string()),
                body: body.to_string().into_bytes(),
            },
        );
    }

    pub fn html(&self, url: &str, body: &str) {
        self.replies.borrow_mut().insert(
            url.to_string(),
            RawResponse {
                status: 200,
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait(?Send)]
impl Transport for StubTransport {
    async fn send(&self, req: RawRequest) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(req.clone());
        Ok(self
            .replies
            .borrow()
            .get(&req.url)
            .cloned()
            .unwrap_or_else(|| RawResponse {
                status: 404,
                content_type: Some("application/json".to_string()),
                body: br#"{"message":"Not found"}"#.to_vec(),
            }))
    }
}

pub fn client(transport: Rc<StubTransport>) -> RequestClient {
    RequestClient::new(
        RequestConfig::default(),
        transport,
        Rc::new(TokioScheduler::new()),
    )
}

#[derive(Default)]
pub struct MemoryContainer {
    html: RefCell<String>,
}

impl ContainerAdapter for MemoryContainer {
    fn set_html(&self, html: &str) {
        *self.html.borrow_mut() = html.to_string();
    }

    fn html(&self) -> String {
        self.html.borrow().clone()
    }

    fn add_class(&self, _class: &str) {}

    fn remove_class(&self, _class: &str) {}
}

/// 只记住当前地址
pub struct SingleEntryHistory {
    current: RefCell<String>,
}

impl HistoryAdapter for SingleEntryHistory {
    fn location(&self) -> Location {
        Location::parse(&self.current.borrow())
    }

    fn push(&self, url: &str) {
        *self.current.borrow_mut() = url.to_string();
    }

    fn replace(&self, url: &str) {
        *self.current.borrow_mut() = url.to_string();
    }

    fn back(&self) {}

    fn forward(&self) {}
}

/// 无动画的路由 + 内存挂载点
pub fn router(requests: RequestClient) -> (Router, Rc<MemoryContainer>) {
    router_with(RouterConfig::default(), requests)
}

pub fn router_with(config: RouterConfig, requests: RequestClient) -> (Router, Rc<MemoryContainer>) {
    let container = Rc::new(MemoryContainer::default());
    let history = Rc::new(SingleEntryHistory {
        current: RefCell::new("/".to_string()),
    });
    let router = Router::builder(
        config.without_animation(),
        container.clone(),
        history,
        Rc::new(TokioScheduler::new()),
    )
    .request_client(requests)
    .build();
    (router, container)
}
