use serde::de::DeserializeOwned;

use crate::error::RequestError;

/// 解码后的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// 按声明的 Content-Type 解码：JSON -> 对象，`text/*` -> 字符串，其余 -> 二进制
    pub fn decode(content_type: Option<&str>, body: &[u8]) -> Result<Self, RequestError> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if mime == "application/json" || mime.ends_with("+json") {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Payload::Json(serde_json::Value::Null));
            }
            return Ok(Payload::Json(serde_json::from_slice(body)?));
        }
        if mime.starts_with("text/") {
            return Ok(Payload::Text(String::from_utf8_lossy(body).into_owned()));
        }
        Ok(Payload::Binary(body.to_vec()))
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// 转为文本；JSON 重新序列化，二进制按 UTF-8 宽松解码
    pub fn into_text(self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text,
            Payload::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// 反序列化为强类型；文本载荷按 JSON 解析
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Text(text) => Ok(serde_json::from_str(&text)?),
            Payload::Binary(_) => Err(RequestError::Decode(
                "expected a JSON response but received binary data".to_string(),
            )),
        }
    }
}
