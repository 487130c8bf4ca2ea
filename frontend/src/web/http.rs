//! 请求原语的浏览器实现
//!
//! 使用 `web_sys::fetch`，响应体统一读取为字节，由请求层按 Content-Type 解码。

use async_trait::async_trait;
use js_sys::{Array, Uint8Array};
use voyage::platform::{FormValue, RawRequest, RawResponse, RequestBody, Transport};
use voyage::TransportError;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

fn js_error(context: &'static str) -> impl Fn(JsValue) -> TransportError {
    move |e| TransportError::new(format!("{}: {:?}", context, e))
}

/// 把请求体转换为 fetch 可接受的值
fn encode_body(body: &RequestBody) -> Result<JsValue, TransportError> {
    match body {
        RequestBody::Json(value) => Ok(JsValue::from_str(&value.to_string())),
        RequestBody::Text(text) => Ok(JsValue::from_str(text)),
        RequestBody::Form(fields) => {
            let form = FormData::new().map_err(js_error("创建 FormData 失败"))?;
            for (name, value) in fields {
                let appended = match value {
                    FormValue::Text(text) => form.append_with_str(name, text),
                    FormValue::File {
                        file_name,
                        content_type,
                        bytes,
                    } => {
                        let parts = Array::of1(&Uint8Array::from(bytes.as_slice()));
                        let options = BlobPropertyBag::new();
                        if let Some(content_type) = content_type {
                            options.set_type(content_type);
                        }
                        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                            .map_err(js_error("创建 Blob 失败"))?;
                        form.append_with_blob_and_filename(name, &blob, file_name)
                    }
                };
                appended.map_err(js_error("写入表单字段失败"))?;
            }
            Ok(form.into())
        }
    }
}

/// 基于 fetch 的请求原语
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: RawRequest) -> Result<RawResponse, TransportError> {
        let headers = Headers::new().map_err(js_error("创建 Headers 失败"))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(js_error("设置 Header 失败"))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&encode_body(body)?);
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(js_error("构建请求失败"))?;

        let window =
            web_sys::window().ok_or_else(|| TransportError::new("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error("网络错误"))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(js_error("Response 类型转换失败"))?;

        let content_type = response.headers().get("Content-Type").ok().flatten();
        let buffer = JsFuture::from(
            response
                .array_buffer()
                .map_err(js_error("读取响应体失败"))?,
        )
        .await
        .map_err(js_error("读取响应体失败"))?;

        Ok(RawResponse {
            status: response.status(),
            content_type,
            body: Uint8Array::new(&buffer).to_vec(),
        })
    }
}
