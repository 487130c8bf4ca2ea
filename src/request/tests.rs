use super::*;
use crate::platform::FormValue;
use crate::platform::mock::{
    CountingIndicator, MockReply, MockTransport, RecordingContainer, RecordingNotifier,
    StaticForm,
};
use crate::platform::native::TokioScheduler;
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::time::Duration;

// =========================================================
// 辅助函数
// =========================================================

struct Harness {
    client: RequestClient,
    transport: Rc<MockTransport>,
    notifier: Rc<RecordingNotifier>,
    indicator: Rc<CountingIndicator>,
}

fn harness(config: RequestConfig) -> Harness {
    let transport = Rc::new(MockTransport::new());
    let notifier = Rc::new(RecordingNotifier::default());
    let indicator = Rc::new(CountingIndicator::default());
    let client = RequestClient::builder(config, transport.clone(), Rc::new(TokioScheduler::new()))
        .notifier(notifier.clone())
        .loading_indicator(indicator.clone())
        .build();
    Harness {
        client,
        transport,
        notifier,
        indicator,
    }
}

fn api_config() -> RequestConfig {
    RequestConfig::default().with_base_url("https://api.example.com")
}

// =========================================================
// 缓存
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_get_is_served_from_cache_until_expiry() {
    let mut config = api_config();
    config.cache_duration_ms = 1_000;
    let h = harness(config);
    let url = "https://api.example.com/api/x";
    h.transport.mock(url, MockReply::json(200, json!({"a": 1})));

    // t = 0
    let first = h.client.get("/api/x").await.unwrap();
    assert_eq!(first, Payload::Json(json!({"a": 1})));
    assert_eq!(h.transport.calls_to(url), 1);

    // t = 500: 命中缓存，不发起请求
    tokio::time::advance(Duration::from_millis(500)).await;
    let second = h.client.get("/api/x").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(h.transport.calls_to(url), 1);

    // t = 1500: 已过期，重新请求
    tokio::time::advance(Duration::from_millis(1_000)).await;
    h.client.get("/api/x").await.unwrap();
    assert_eq!(h.transport.calls_to(url), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_cache_bypasses_read_but_refreshes_entry() {
    let h = harness(api_config());
    let url = "https://api.example.com/api/tours";
    h.transport.mock(url, MockReply::json(200, json!([1])));

    h.client.get("/api/tours").await.unwrap();
    h.client
        .request("/api/tours", RequestOptions::new().no_cache())
        .await
        .unwrap();
    assert_eq!(h.transport.calls_to(url), 2);

    h.client.get("/api/tours").await.unwrap();
    assert_eq!(h.transport.calls_to(url), 2);
}

#[tokio::test(start_paused = true)]
async fn test_non_get_requests_are_not_cached() {
    let h = harness(api_config());
    let url = "https://api.example.com/api/bookings";
    h.transport.mock(url, MockReply::json(201, json!({"ok": true})));

    h.client
        .post("/api/bookings", RequestBody::Json(json!({"tour": 1})))
        .await
        .unwrap();
    h.client
        .post("/api/bookings", RequestBody::Json(json!({"tour": 1})))
        .await
        .unwrap();
    assert_eq!(h.transport.calls_to(url), 2);
    assert_eq!(h.client.cache_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_cache_always_hits_network() {
    let mut config = api_config();
    config.enable_cache = false;
    let h = harness(config);
    let url = "https://api.example.com/api/x";
    h.transport.mock(url, MockReply::json(200, json!(1)));

    h.client.get("/api/x").await.unwrap();
    h.client.get("/api/x").await.unwrap();
    assert_eq!(h.transport.calls_to(url), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_and_sweep() {
    let mut config = api_config();
    config.cache_duration_ms = 1_000;
    let h = harness(config);
    h.transport.mock(
        "https://api.example.com/a",
        MockReply::json(200, json!("a")),
    );
    h.transport.mock(
        "https://api.example.com/b",
        MockReply::json(200, json!("b")),
    );

    h.client.get("/a").await.unwrap();
    h.client.get("/b").await.unwrap();
    assert_eq!(h.client.cache_len(), 2);

    assert!(h.client.invalidate("/a"));
    assert_eq!(h.client.cache_len(), 1);

    tokio::time::advance(Duration::from_millis(1_500)).await;
    assert_eq!(h.client.sweep_expired(), 1);
    assert_eq!(h.client.cache_len(), 0);
}

// =========================================================
// 错误处理
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_http_error_message_from_json_body() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/api/tours/9",
        MockReply::json(404, json!({"success": false, "message": "Tour not found"})),
    );
    h.transport.mock(
        "https://api.example.com/api/login",
        MockReply::json(401, json!({"error": "Unauthorized"})),
    );

    let err = h.client.get("/api/tours/9").await.unwrap_err();
    assert_eq!(
        err,
        RequestError::Http {
            status: 404,
            message: "Tour not found".to_string()
        }
    );

    let err = h.client.get("/api/login").await.unwrap_err();
    assert_eq!(err.message(), "Unauthorized");
}

#[tokio::test(start_paused = true)]
async fn test_http_error_falls_back_to_text_then_status() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/text",
        MockReply::text(502, "text/plain", "Bad gateway"),
    );
    h.transport.mock(
        "https://api.example.com/empty",
        MockReply::text(500, "text/plain", ""),
    );

    let err = h.client.get("/text").await.unwrap_err();
    assert_eq!(err.message(), "Bad gateway");

    let err = h.client.get("/empty").await.unwrap_err();
    assert_eq!(err.message(), "Error 500");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test(start_paused = true)]
async fn test_default_handler_notifies_and_error_is_rethrown() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/down",
        MockReply::failure("connection refused"),
    );

    let err = h.client.get("/down").await.unwrap_err();
    assert_eq!(err, RequestError::Network("connection refused".to_string()));
    assert_eq!(
        *h.notifier.messages.borrow(),
        vec!["connection refused".to_string()]
    );
    // 失败的响应不会写入缓存
    assert_eq!(h.client.cache_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_per_call_handler_replaces_default() {
    let h = harness(api_config());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_in_handler = seen.clone();

    let result = h
        .client
        .request(
            "/missing",
            RequestOptions::new().on_error(move |err, url| {
                seen_in_handler
                    .borrow_mut()
                    .push(format!("{} <- {}", err, url));
            }),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(
        *seen.borrow(),
        vec!["Not Found <- https://api.example.com/missing".to_string()]
    );
    assert!(h.notifier.messages.borrow().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_wins_race_against_slow_response() {
    let mut config = api_config();
    config.timeout_ms = 1_000;
    let h = harness(config);
    h.transport.mock(
        "https://api.example.com/slow",
        MockReply::json(200, json!({})).after(Duration::from_secs(5)),
    );

    let err = h.client.get("/slow").await.unwrap_err();
    assert_eq!(err, RequestError::Timeout(1_000));
    assert_eq!(
        *h.notifier.messages.borrow(),
        vec!["Request timed out after 1000 ms".to_string()]
    );
}

// =========================================================
// 加载指示器
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_fast_request_never_shows_indicator() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/fast",
        MockReply::json(200, json!({})).after(Duration::from_millis(100)),
    );

    h.client.get("/fast").await.unwrap();
    assert_eq!(h.indicator.shows.get(), 0);
    assert_eq!(h.indicator.hides.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_request_shows_then_hides_indicator() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/slow",
        MockReply::json(200, json!({})).after(Duration::from_millis(800)),
    );

    h.client.get("/slow").await.unwrap();
    assert_eq!(h.indicator.shows.get(), 1);
    assert_eq!(h.indicator.hides.get(), 1);
    assert!(!h.client.is_loading_visible());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_indicator() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/a",
        MockReply::json(200, json!(1)).after(Duration::from_millis(500)),
    );
    h.transport.mock(
        "https://api.example.com/b",
        MockReply::json(200, json!(2)).after(Duration::from_millis(900)),
    );

    let indicator = h.indicator.clone();
    let client = h.client.clone();
    let observer = async move {
        // a 已完成、b 仍在进行：指示器必须保持可见
        tokio::time::sleep(Duration::from_millis(700)).await;
        (client.is_loading_visible(), indicator.hides.get())
    };

    let (a, b, (visible_mid, hides_mid)) =
        futures::join!(h.client.get("/a"), h.client.get("/b"), observer);
    assert!(a.is_ok() && b.is_ok());
    assert!(visible_mid);
    assert_eq!(hides_mid, 0);
    assert_eq!(h.indicator.shows.get(), 1);
    assert_eq!(h.indicator.hides.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_request_hides_indicator() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/slow",
        MockReply::json(200, json!({})).after(Duration::from_secs(5)),
    );

    // 调用方自己的超时在响应返回前丢弃了请求
    let outcome = tokio::time::timeout(Duration::from_secs(1), h.client.get("/slow")).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.indicator.shows.get(), 1);
    assert_eq!(h.indicator.hides.get(), 1);
    assert!(!h.client.is_loading_visible());
}

#[tokio::test(start_paused = true)]
async fn test_indicator_disabled_by_config() {
    let mut config = api_config();
    config.loading_indicator.show = false;
    let h = harness(config);
    h.transport.mock(
        "https://api.example.com/slow",
        MockReply::json(200, json!({})).after(Duration::from_millis(800)),
    );

    h.client.get("/slow").await.unwrap();
    assert_eq!(h.indicator.shows.get(), 0);
}

// =========================================================
// 请求构造与解码
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_headers_merge_and_json_content_type() {
    let mut config = api_config();
    config
        .default_headers
        .insert("Accept".to_string(), "application/json".to_string());
    config
        .default_headers
        .insert("X-Client".to_string(), "voyage".to_string());
    let h = harness(config);

    let _ = h
        .client
        .request(
            "/api/bookings",
            RequestOptions::new()
                .method(HttpMethod::Put)
                .header("accept", "text/plain")
                .body(RequestBody::Json(json!({"seats": 2}))),
        )
        .await;

    let req = h.transport.last_request().unwrap();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(header_value(&req.headers, "Accept"), Some("text/plain"));
    assert_eq!(header_value(&req.headers, "X-Client"), Some("voyage"));
    assert_eq!(
        header_value(&req.headers, "Content-Type"),
        Some("application/json")
    );
    assert_eq!(req.body, Some(RequestBody::Json(json!({"seats": 2}))));
}

#[derive(Debug, Deserialize, PartialEq)]
struct TourStub {
    id: u32,
    name: String,
}

#[tokio::test(start_paused = true)]
async fn test_get_json_decodes_typed_value() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/api/tours/1",
        MockReply::json(200, json!({"id": 1, "name": "Danube"})),
    );
    h.transport.mock(
        "https://api.example.com/api/tours/2",
        MockReply::json(200, json!({"id": "two"})),
    );

    let tour: TourStub = h.client.get_json("/api/tours/1").await.unwrap();
    assert_eq!(
        tour,
        TourStub {
            id: 1,
            name: "Danube".to_string()
        }
    );

    let err = h
        .client
        .get_json::<TourStub>("/api/tours/2")
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}

// =========================================================
// load_html / submit_form
// =========================================================

#[tokio::test(start_paused = true)]
async fn test_load_html_replaces_content_and_runs_scripts() {
    let h = harness(api_config());
    h.transport.mock(
        "https://api.example.com/partials/reviews.html",
        MockReply::text(200, "text/html; charset=utf-8", "<ul><script>init()</script></ul>"),
    );
    let target = RecordingContainer::new();

    h.client
        .load_html("/partials/reviews.html", &target, LoadHtmlOptions::default())
        .await
        .unwrap();
    assert_eq!(target.html(), "<ul><script>init()</script></ul>");
    assert_eq!(target.script_runs.get(), 1);

    let quiet = LoadHtmlOptions {
        execute_scripts: false,
        no_cache: true,
    };
    h.client
        .load_html("/partials/reviews.html", &target, quiet)
        .await
        .unwrap();
    assert_eq!(target.script_runs.get(), 1);
    assert_eq!(
        h.transport
            .calls_to("https://api.example.com/partials/reviews.html"),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_html_failure_leaves_target_untouched() {
    let h = harness(api_config());
    let target = RecordingContainer::new();
    target.set_html("before");

    let err = h
        .client
        .load_html("/partials/missing.html", &target, LoadHtmlOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(target.html(), "before");
}

fn booking_form(method: Option<HttpMethod>) -> StaticForm {
    StaticForm {
        method,
        action: Some("/api/bookings".to_string()),
        fields: vec![
            ("name".to_string(), FormValue::Text("Ada".to_string())),
            ("seats".to_string(), FormValue::Text("2".to_string())),
        ],
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_form_as_multipart_uses_form_defaults() {
    let h = harness(api_config());
    let _ = h
        .client
        .submit_form(&booking_form(None), None, RequestOptions::new())
        .await;

    let req = h.transport.last_request().unwrap();
    assert_eq!(req.url, "https://api.example.com/api/bookings");
    assert_eq!(req.method, HttpMethod::Post);
    assert!(matches!(req.body, Some(RequestBody::Form(ref fields)) if fields.len() == 2));
    assert_eq!(header_value(&req.headers, "Content-Type"), None);
}

#[tokio::test(start_paused = true)]
async fn test_submit_form_as_json_when_content_type_is_json() {
    let h = harness(api_config());
    let _ = h
        .client
        .submit_form(
            &booking_form(Some(HttpMethod::Put)),
            Some("/api/bookings/7"),
            RequestOptions::new().header("Content-Type", "application/json"),
        )
        .await;

    let req = h.transport.last_request().unwrap();
    assert_eq!(req.url, "https://api.example.com/api/bookings/7");
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(
        req.body,
        Some(RequestBody::Json(json!({"name": "Ada", "seats": "2"})))
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_get_form_encodes_query() {
    let h = harness(api_config());
    let _ = h
        .client
        .submit_form(
            &booking_form(Some(HttpMethod::Get)),
            Some("/search"),
            RequestOptions::new(),
        )
        .await;

    let req = h.transport.last_request().unwrap();
    assert_eq!(req.url, "https://api.example.com/search?name=Ada&seats=2");
    assert!(req.body.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_submit_form_without_action_fails() {
    let h = harness(api_config());
    let form = StaticForm {
        method: None,
        action: None,
        fields: Vec::new(),
    };
    let err = h
        .client
        .submit_form(&form, None, RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Build(_)));
    assert!(h.transport.requests.borrow().is_empty());
}
