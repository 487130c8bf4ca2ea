// =========================================================
// 测试环境实现 (Mock)
// =========================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use voyage_shared::HttpMethod;

use super::*;

/// 预置的响应
#[derive(Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub delay: Duration,
    pub network_error: Option<String>,
}

impl MockReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.to_string().into_bytes(),
            delay: Duration::ZERO,
            network_error: None,
        }
    }

    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
            network_error: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            status: 0,
            content_type: None,
            body: Vec::new(),
            delay: Duration::ZERO,
            network_error: Some(message.to_string()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct MockTransport {
    // URL -> 响应
    replies: RefCell<HashMap<String, MockReply>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<RawRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock(&self, url: &str, reply: MockReply) {
        self.replies.borrow_mut().insert(url.to_string(), reply);
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.url == url).count()
    }

    pub fn last_request(&self) -> Option<RawRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: RawRequest) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(req.clone());

        let reply = self.replies.borrow().get(&req.url).cloned();
        let Some(reply) = reply else {
            return Ok(RawResponse {
                status: 404,
                content_type: Some("text/plain".to_string()),
                body: b"Not Found".to_vec(),
            });
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        if let Some(message) = reply.network_error {
            return Err(TransportError::new(message));
        }
        Ok(RawResponse {
            status: reply.status,
            content_type: reply.content_type,
            body: reply.body,
        })
    }
}

/// 记录所有写入与 class 变化的挂载点
#[derive(Default)]
pub struct RecordingContainer {
    html: RefCell<String>,
    classes: RefCell<Vec<String>>,
    /// 按顺序记录的操作：`html:<内容>` / `+class` / `-class`
    pub events: RefCell<Vec<String>>,
    pub scrolls: Cell<u32>,
    pub script_runs: Cell<u32>,
}

impl RecordingContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix("html:").map(str::to_string))
            .collect()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }
}

impl ContainerAdapter for RecordingContainer {
    fn set_html(&self, html: &str) {
        *self.html.borrow_mut() = html.to_string();
        self.events.borrow_mut().push(format!("html:{}", html));
    }

    fn html(&self) -> String {
        self.html.borrow().clone()
    }

    fn add_class(&self, class: &str) {
        self.classes.borrow_mut().push(class.to_string());
        self.events.borrow_mut().push(format!("+{}", class));
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
        self.events.borrow_mut().push(format!("-{}", class));
    }

    fn scroll_to_top(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn reexecute_scripts(&self) {
        self.script_runs.set(self.script_runs.get() + 1);
    }
}

/// 内存中的浏览历史
pub struct MemoryHistory {
    pub entries: RefCell<Vec<String>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: RefCell::new(vec![initial.to_string()]),
            index: Cell::new(0),
        }
    }
}

impl HistoryAdapter for MemoryHistory {
    fn location(&self) -> Location {
        let entries = self.entries.borrow();
        Location::parse(entries.get(self.index.get()).map(String::as_str).unwrap_or("/"))
    }

    fn push(&self, url: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push(url.to_string());
        self.index.set(entries.len() - 1);
    }

    fn replace(&self, url: &str) {
        let mut entries = self.entries.borrow_mut();
        let index = self.index.get();
        entries[index] = url.to_string();
    }

    fn back(&self) {
        self.index.set(self.index.get().saturating_sub(1));
    }

    fn forward(&self) {
        let len = self.entries.borrow().len();
        if self.index.get() + 1 < len {
            self.index.set(self.index.get() + 1);
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[derive(Default)]
pub struct CountingIndicator {
    pub shows: Cell<u32>,
    pub hides: Cell<u32>,
}

impl LoadingIndicator for CountingIndicator {
    fn show(&self) {
        self.shows.set(self.shows.get() + 1);
    }

    fn hide(&self) {
        self.hides.set(self.hides.get() + 1);
    }
}

pub struct StaticForm {
    pub method: Option<HttpMethod>,
    pub action: Option<String>,
    pub fields: Vec<(String, FormValue)>,
}

impl FormSource for StaticForm {
    fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    fn action(&self) -> Option<String> {
        self.action.clone()
    }

    fn fields(&self) -> Vec<(String, FormValue)> {
        self.fields.clone()
    }
}
