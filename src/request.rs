//! 请求层
//!
//! 在单一请求原语 ([`Transport`]) 之上提供：
//! - GET/POST/PUT/DELETE 便捷方法
//! - GET 响应的限时内存缓存
//! - 与计时器赛跑的超时
//! - 按 Content-Type 统一解码
//! - 延迟显示的共享加载指示器
//! - 可替换的错误处理钩子（处理后依然向调用方返回错误）

use std::cell::RefCell;
use std::collections::HashMap;
use std::pin::pin;
use std::rc::Rc;

use futures::future::{Either, select};
use serde::de::DeserializeOwned;
use voyage_shared::HttpMethod;

use crate::error::RequestError;
use crate::platform::{
    ContainerAdapter, FormSource, LoadingIndicator, Notifier, RawRequest, RawResponse,
    RequestBody, Scheduler, Transport,
};

mod cache;
mod config;
mod loading;
mod payload;

pub use cache::{CacheEntry, ResponseCache};
pub use config::{
    DEFAULT_CACHE_DURATION_MS, DEFAULT_LOADING_DELAY_MS, DEFAULT_TIMEOUT_MS,
    LoadingIndicatorConfig, RequestConfig,
};
pub use loading::{LoadingTracker, PendingGuard};
pub use payload::Payload;

#[cfg(test)]
mod tests;

const CONTENT_TYPE: &str = "Content-Type";
const MIME_JSON: &str = "application/json";

/// 错误处理钩子：接收错误与完整 URL
pub type ErrorHandler = Rc<dyn Fn(&RequestError, &str)>;

// =========================================================
// 单次调用选项
// =========================================================

#[derive(Clone, Default)]
pub struct RequestOptions {
    /// 未设置时为 GET；`submit_form` 会回退到表单声明的 method
    pub method: Option<HttpMethod>,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    /// 跳过缓存读取
    pub no_cache: bool,
    /// 替代全局错误处理
    pub error_handler: Option<ErrorHandler>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&RequestError, &str) + 'static) -> Self {
        self.error_handler = Some(Rc::new(handler));
        self
    }
}

/// `load_html` 选项
#[derive(Debug, Clone)]
pub struct LoadHtmlOptions {
    pub execute_scripts: bool,
    pub no_cache: bool,
}

impl Default for LoadHtmlOptions {
    fn default() -> Self {
        Self {
            execute_scripts: true,
            no_cache: false,
        }
    }
}

// =========================================================
// RequestClient
// =========================================================

struct ClientInner {
    config: RequestConfig,
    transport: Rc<dyn Transport>,
    scheduler: Rc<dyn Scheduler>,
    cache: RefCell<ResponseCache>,
    loading: RefCell<LoadingTracker>,
    error_handler: ErrorHandler,
}

/// 请求客户端
///
/// 克隆开销很小，克隆体共享同一份缓存与加载状态。
/// 应用中只构造一次，再注入给路由和各页面。
#[derive(Clone)]
pub struct RequestClient {
    inner: Rc<ClientInner>,
}

pub struct RequestClientBuilder {
    config: RequestConfig,
    transport: Rc<dyn Transport>,
    scheduler: Rc<dyn Scheduler>,
    notifier: Option<Rc<dyn Notifier>>,
    indicator: Option<Rc<dyn LoadingIndicator>>,
    error_handler: Option<ErrorHandler>,
}

impl RequestClientBuilder {
    /// 默认错误处理使用的通知组件
    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn loading_indicator(mut self, indicator: Rc<dyn LoadingIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// 替换全局默认错误处理
    pub fn error_handler(mut self, handler: impl Fn(&RequestError, &str) + 'static) -> Self {
        self.error_handler = Some(Rc::new(handler));
        self
    }

    pub fn build(self) -> RequestClient {
        let error_handler = self
            .error_handler
            .unwrap_or_else(|| default_error_handler(self.notifier));
        RequestClient {
            inner: Rc::new(ClientInner {
                cache: RefCell::new(ResponseCache::new(self.config.cache_duration())),
                loading: RefCell::new(LoadingTracker::new(self.indicator)),
                config: self.config,
                transport: self.transport,
                scheduler: self.scheduler,
                error_handler,
            }),
        }
    }
}

/// 默认错误处理：记录日志并弹出通知
fn default_error_handler(notifier: Option<Rc<dyn Notifier>>) -> ErrorHandler {
    Rc::new(move |err: &RequestError, url: &str| {
        log::error!("request to {} failed: {}", url, err);
        if let Some(notifier) = &notifier {
            notifier.notify(&err.message());
        }
    })
}

impl RequestClient {
    pub fn builder(
        config: RequestConfig,
        transport: Rc<dyn Transport>,
        scheduler: Rc<dyn Scheduler>,
    ) -> RequestClientBuilder {
        RequestClientBuilder {
            config,
            transport,
            scheduler,
            notifier: None,
            indicator: None,
            error_handler: None,
        }
    }

    pub fn new(
        config: RequestConfig,
        transport: Rc<dyn Transport>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self::builder(config, transport, scheduler).build()
    }

    pub fn config(&self) -> &RequestConfig {
        &self.inner.config
    }

    pub fn resolve_url(&self, path: &str) -> String {
        self.inner.config.resolve_url(path)
    }

    // --- 便捷方法 ---

    pub async fn get(&self, path: &str) -> Result<Payload, RequestError> {
        self.request(path, RequestOptions::new()).await
    }

    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Payload, RequestError> {
        self.request(path, RequestOptions::new().method(HttpMethod::Post).body(body))
            .await
    }

    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Payload, RequestError> {
        self.request(path, RequestOptions::new().method(HttpMethod::Put).body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Payload, RequestError> {
        self.request(path, RequestOptions::new().method(HttpMethod::Delete))
            .await
    }

    /// GET 并反序列化为强类型
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.get(path).await?.into_typed()
    }

    // --- 核心流程 ---

    /// 发起请求
    ///
    /// 流程：缓存命中 -> 直接返回；否则 请求原语 (与超时赛跑) -> 解码 -> 写缓存。
    /// 失败时先交给错误处理钩子，再原样返回给调用方。
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Payload, RequestError> {
        let url = self.resolve_url(path);
        let method = options.method.unwrap_or_default();
        let caches = method == HttpMethod::Get && self.inner.config.enable_cache;

        if caches && !options.no_cache {
            let now = self.inner.scheduler.now();
            let cached = self.inner.cache.borrow_mut().get(&url, now);
            if let Some(payload) = cached {
                log::debug!("cache hit: {}", url);
                return Ok(payload);
            }
            log::debug!("cache miss: {}", url);
        }

        let error_handler = options.error_handler.clone();
        match self.execute(&url, method, options).await {
            Ok(payload) => {
                if caches {
                    let now = self.inner.scheduler.now();
                    self.inner
                        .cache
                        .borrow_mut()
                        .insert(url, payload.clone(), now);
                }
                Ok(payload)
            }
            Err(err) => {
                let handler = error_handler.unwrap_or_else(|| self.inner.error_handler.clone());
                handler(&err, &url);
                Err(err)
            }
        }
    }

    /// 执行网络请求，并在延迟到期仍未完成时显示加载指示器
    async fn execute(
        &self,
        url: &str,
        method: HttpMethod,
        options: RequestOptions,
    ) -> Result<Payload, RequestError> {
        let request = self.build_request(url, method, options);
        let fetch = self.fetch_with_timeout(request);

        let indicator = &self.inner.config.loading_indicator;
        if !indicator.show {
            return fetch.await;
        }

        let pending = PendingGuard::begin(&self.inner.loading);
        let fetch = pin!(fetch);
        let delay = self.inner.scheduler.sleep(indicator.delay());
        match select(fetch, delay).await {
            Either::Left((result, _)) => result,
            Either::Right(((), fetch)) => {
                pending.reveal();
                fetch.await
            }
        }
    }

    /// 请求原语与超时计时器赛跑，先完成者胜出
    async fn fetch_with_timeout(&self, request: RawRequest) -> Result<Payload, RequestError> {
        let timeout = self.inner.config.timeout();
        let send = self.inner.transport.send(request);
        let timer = self.inner.scheduler.sleep(timeout);

        let response = match select(send, timer).await {
            Either::Left((result, _)) => result?,
            Either::Right(_) => return Err(RequestError::Timeout(timeout.as_millis() as u64)),
        };

        if !response.ok() {
            return Err(http_error(&response));
        }
        Payload::decode(response.content_type.as_deref(), &response.body)
    }

    fn build_request(&self, url: &str, method: HttpMethod, options: RequestOptions) -> RawRequest {
        let mut headers = self.inner.config.default_headers.clone();
        for (key, value) in options.headers {
            // 大小写不敏感地覆盖默认值
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
            headers.insert(key, value);
        }

        match &options.body {
            Some(RequestBody::Json(_)) if header_value(&headers, CONTENT_TYPE).is_none() => {
                headers.insert(CONTENT_TYPE.to_string(), MIME_JSON.to_string());
            }
            // multipart 边界由请求原语生成
            Some(RequestBody::Form(_)) => {
                headers.retain(|key, _| !key.eq_ignore_ascii_case(CONTENT_TYPE));
            }
            _ => {}
        }

        RawRequest {
            url: url.to_string(),
            method,
            headers,
            body: options.body,
        }
    }

    // --- 派生操作 ---

    /// 拉取远程 HTML 写入目标元素，并（默认）重新执行其中的脚本
    pub async fn load_html(
        &self,
        path: &str,
        target: &dyn ContainerAdapter,
        options: LoadHtmlOptions,
    ) -> Result<(), RequestError> {
        let mut request = RequestOptions::new().header("Accept", "text/html");
        if options.no_cache {
            request = request.no_cache();
        }
        let html = self.request(path, request).await?.into_text();
        target.set_html(&html);
        if options.execute_scripts {
            target.reexecute_scripts();
        }
        Ok(())
    }

    /// 提交表单
    ///
    /// `action`/`options.method` 未指定时使用表单自身声明的值。
    /// Content-Type 为 JSON 时字段序列化为对象，否则以 multipart 提交；
    /// GET 表单的字段编码进查询字符串。
    pub async fn submit_form(
        &self,
        form: &dyn FormSource,
        action: Option<&str>,
        mut options: RequestOptions,
    ) -> Result<Payload, RequestError> {
        let action = match action.map(str::to_string).or_else(|| form.action()) {
            Some(action) => action,
            None => {
                let err = RequestError::Build("form has no action".to_string());
                let handler = options
                    .error_handler
                    .clone()
                    .unwrap_or_else(|| self.inner.error_handler.clone());
                handler(&err, "");
                return Err(err);
            }
        };
        let method = options
            .method
            .or_else(|| form.method())
            .unwrap_or(HttpMethod::Post);
        options.method = Some(method);

        let fields = form.fields();
        if method == HttpMethod::Get {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_text())))
                .finish();
            let separator = if action.contains('?') { '&' } else { '?' };
            let url = format!("{}{}{}", action, separator, query);
            return self.request(&url, options).await;
        }

        let wants_json = header_value(&options.headers, CONTENT_TYPE)
            .or_else(|| header_value(&self.inner.config.default_headers, CONTENT_TYPE))
            .is_some_and(|ct| ct.contains(MIME_JSON));

        options.body = Some(if wants_json {
            let object: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.as_text().to_string())))
                .collect();
            RequestBody::Json(serde_json::Value::Object(object))
        } else {
            RequestBody::Form(fields)
        });

        self.request(&action, options).await
    }

    // --- 缓存管理 ---

    pub fn invalidate(&self, path: &str) -> bool {
        let url = self.resolve_url(path);
        self.inner.cache.borrow_mut().invalidate(&url)
    }

    pub fn clear_cache(&self) {
        self.inner.cache.borrow_mut().clear();
    }

    /// 显式清理过期条目
    pub fn sweep_expired(&self) -> usize {
        let now = self.inner.scheduler.now();
        self.inner.cache.borrow_mut().sweep(now)
    }

    pub fn cache_len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    pub fn is_loading_visible(&self) -> bool {
        self.inner.loading.borrow().is_visible()
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// 非 2xx 响应的错误消息：JSON 错误体中的 `message`/`error` -> 原始文本 -> `Error <status>`
fn http_error(response: &RawResponse) -> RequestError {
    let text = response.text();
    let from_json = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| {
            ["message", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    let message = from_json
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("Error {}", response.status));

    RequestError::Http {
        status: response.status,
        message,
    }
}
