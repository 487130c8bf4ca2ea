//! 宽松反序列化辅助函数
//!
//! 后端对同一逻辑字段的类型并不统一（数字 ID 与字符串 ID、字符串形式的价格等），
//! 这里集中处理这些差异。

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<IdRepr> for String {
    fn from(value: IdRepr) -> Self {
        match value {
            IdRepr::Text(s) => s,
            IdRepr::Int(n) => n.to_string(),
            IdRepr::Float(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Number(f64),
    Text(String),
}

pub(crate) fn default_true() -> bool {
    true
}

/// 接受字符串或数字形式的 ID
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

pub(crate) fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

/// 接受数字、数字字符串或 null；无法解析的字符串视为缺失
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberRepr>::deserialize(deserializer)? {
            Some(NumberRepr::Number(n)) => Some(n),
            Some(NumberRepr::Text(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}
