//! 原生平台实现：tokio 定时器 + reqwest 请求原语

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use voyage_shared::{HttpMethod, Timestamp};

use super::{FormValue, RawRequest, RawResponse, RequestBody, Scheduler, Transport};
use crate::error::TransportError;

// =========================================================
// TokioScheduler
// =========================================================

/// 基于 `tokio::time` 的时钟
///
/// `now()` 以创建时的墙钟为原点，再叠加 tokio 单调时钟的流逝时间，
/// 因此在 `tokio::time::pause()` 下同样可控。
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    origin_ms: i64,
    started: tokio::time::Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Self {
            origin_ms,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Scheduler for TokioScheduler {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.origin_ms) + self.started.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =========================================================
// ReqwestTransport
// =========================================================

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

fn multipart_form(
    fields: Vec<(String, FormValue)>,
) -> Result<reqwest::multipart::Form, TransportError> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in fields {
        form = match value {
            FormValue::Text(text) => form.text(name, text),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| TransportError::new(format!("Invalid mime type: {}", e)))?;
                }
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, req: RawRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(to_reqwest_method(req.method), &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        builder = match req.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.body(value.to_string()),
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Form(fields)) => builder.multipart(multipart_form(fields)?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::new(format!("Network error: {}", e)))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read body: {}", e)))?
            .to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
