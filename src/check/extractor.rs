use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::check::types::CheckError;
use crate::http::Response;

/// JSON 路径中的一段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// JSONPath 子集：`$`、`$.a.b`、`$.items[0].id`、`$['odd key']`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn parse(input: &str) -> Result<Self, CheckError> {
        let raw = input.trim();
        let rest = raw.strip_prefix('$').ok_or_else(|| {
            CheckError::InvalidSelector(format!("JSON path must start with '$': {}", raw))
        })?;

        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == '.' || next == '[' {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(CheckError::InvalidSelector(format!(
                            "empty field name in {}",
                            raw
                        )));
                    }
                    segments.push(PathSegment::Field(name));
                }
                '[' => {
                    let mut inner = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(ch) => inner.push(ch),
                            None => {
                                return Err(CheckError::InvalidSelector(format!(
                                    "unclosed '[' in {}",
                                    raw
                                )));
                            }
                        }
                    }
                    segments.push(Self::parse_bracket(inner.trim(), raw)?);
                }
                _ => {
                    return Err(CheckError::InvalidSelector(format!(
                        "unexpected '{}' in {}",
                        c, raw
                    )));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    fn parse_bracket(inner: &str, raw: &str) -> Result<PathSegment, CheckError> {
        let quoted = inner
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));

        if let Some(name) = quoted {
            return Ok(PathSegment::Field(name.to_string()));
        }

        inner.parse().map(PathSegment::Index).map_err(|_| {
            CheckError::InvalidSelector(format!("invalid array index '{}' in {}", inner, raw))
        })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn find<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                PathSegment::Field(name) => current.get(name.as_str()),
                PathSegment::Index(index) => current.get(*index),
            })
    }

    /// 解析 JSON 文本并取出路径对应的值
    pub fn read(&self, body: &str) -> Result<Value, CheckError> {
        let json: Value = serde_json::from_str(body)?;
        self.find(&json)
            .cloned()
            .ok_or_else(|| CheckError::PathNotFound(format!("Path '{}' not found", self.raw)))
    }
}

impl FromStr for JsonPath {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 检查的取值位置
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// HTTP 状态码
    Status,
    /// 响应 Header
    Header(String),
    /// JSON Body 路径
    Body(JsonPath),
}

impl Selector {
    /// 解析取值表达式
    ///
    /// 支持的格式：
    /// - `status`
    /// - `headers.Content-Type`（或 `header.Content-Type`）
    /// - `$.user.id`、`$.items[0]`
    /// - `body.user.id` 或直接 `user.id`，等价于 `$.user.id`
    pub fn parse(input: &str) -> Result<Self, CheckError> {
        let input = input.trim();

        if input == "status" {
            return Ok(Selector::Status);
        }

        if let Some(name) = input
            .strip_prefix("headers.")
            .or_else(|| input.strip_prefix("header."))
        {
            if name.is_empty() {
                return Err(CheckError::InvalidSelector(
                    "header name is empty".to_string(),
                ));
            }
            return Ok(Selector::Header(name.to_string()));
        }

        if input.starts_with('$') {
            return Ok(Selector::Body(JsonPath::parse(input)?));
        }

        if input.is_empty() || input == "body" {
            return Ok(Selector::Body(JsonPath::parse("$")?));
        }

        let rest = input.strip_prefix("body.").unwrap_or(input);
        Ok(Selector::Body(JsonPath::parse(&format!("$.{}", rest))?))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Status => write!(f, "status"),
            Selector::Header(name) => write!(f, "headers.{}", name),
            Selector::Body(path) => write!(f, "{}", path),
        }
    }
}

/// 从响应中提取值
pub fn extract_value(response: &Response, selector: &Selector) -> Result<Value, CheckError> {
    match selector {
        Selector::Status => Ok(Value::from(response.status.code())),

        Selector::Header(name) => response
            .header(name)
            .map(|v| Value::String(v.to_string()))
            .ok_or_else(|| CheckError::PathNotFound(format!("Header '{}' not found", name))),

        Selector::Body(path) => path.read(&response.body),
    }
}

/// 值的文本形式：字符串取原文，其余取 JSON 文本
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
