//! 路由模式
//!
//! `/tour/:id` 形式的模板：`:name` 匹配一段不含 `/` 的字符，按声明顺序捕获。

use regex::Regex;

use super::Params;
use crate::error::RouterError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Param(&'a str),
}

/// 将模板拆分为字面量与命名参数
fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(colon) = rest.find(':') {
        let after = &rest[colon + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            // 孤立的 `:` 视为字面量
            out.push(Piece::Literal(&rest[..=colon]));
            rest = after;
            continue;
        }
        if colon > 0 {
            out.push(Piece::Literal(&rest[..colon]));
        }
        out.push(Piece::Param(&after[..name_len]));
        rest = &after[name_len..];
    }
    if !rest.is_empty() {
        out.push(Piece::Literal(rest));
    }
    out
}

/// 编译后的路由模式
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    matcher: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, RouterError> {
        let mut regex = String::from("^");
        let mut param_names = Vec::new();
        for piece in pieces(pattern) {
            match piece {
                Piece::Literal(text) => regex.push_str(&regex::escape(text)),
                Piece::Param(name) => {
                    regex.push_str("([^/]+)");
                    param_names.push(name.to_string());
                }
            }
        }
        regex.push('$');

        let matcher = Regex::new(&regex).map_err(|e| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            matcher,
            param_names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// 匹配路径并按位置提取参数
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.matcher.captures(path)?;
        let values = self
            .param_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                (name.clone(), value.to_string())
            })
            .collect();
        Some(Params::new(values))
    }
}

/// 将 URL 模板中的 `:param` 替换为参数值；未知参数保持原样
pub fn substitute(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template) {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Param(name) => match params.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push(':');
                    out.push_str(name);
                }
            },
        }
    }
    out
}
