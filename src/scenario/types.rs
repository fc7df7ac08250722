use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::check::JsonPath;
use crate::http::Method;
use crate::{Result, RukiteError};

fn default_operator() -> String {
    "equals".to_string()
}

/// 一个完整的测试场景
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub description: Option<String>,

    /// 场景级变量，优先级高于配置文件中的设置
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub commands: Vec<Command>,
}

/// 一次声明式的 HTTP 调用及其检查
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// 命令名称，用作上下文中的键
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub verb: String,

    /// 目标服务名称，缺省时使用默认服务
    #[serde(default)]
    pub service: Option<String>,

    pub uri: String,

    /// 字符串原样作为请求体，其他 JSON 值序列化后使用
    #[serde(default)]
    pub body: Option<Value>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub expected_status: Option<u16>,

    #[serde(default)]
    pub checks: Vec<Check>,

    #[serde(default)]
    pub automatic_check: Option<bool>,

    #[serde(default)]
    pub disabled: bool,

    /// 执行前等待的毫秒数
    #[serde(default)]
    pub wait: u64,

    #[serde(default)]
    pub pagination: Option<Pagination>,

    #[serde(default)]
    pub url_encoding_enabled: Option<bool>,
}

impl Command {
    pub fn new(verb: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: None,
            description: None,
            verb: verb.into(),
            service: None,
            uri: uri.into(),
            body: None,
            headers: BTreeMap::new(),
            expected_status: None,
            checks: Vec::new(),
            automatic_check: None,
            disabled: false,
            wait: 0,
            pagination: None,
            url_encoding_enabled: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_automatic_check(mut self, enabled: bool) -> Self {
        self.automatic_check = Some(enabled);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_wait(mut self, millis: u64) -> Self {
        self.wait = millis;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// 已知动词时按动词推断：POST 201，DELETE 204，其余 200
    pub fn expected_status(&self) -> u16 {
        self.expected_status
            .unwrap_or_else(|| match Method::parse(&self.verb) {
                Ok(Method::Post) => 201,
                Ok(Method::Delete) => 204,
                _ => 200,
            })
    }

    /// 未显式设置时，只有期望 201 的 POST 才做自动检查
    pub fn automatic_check(&self) -> bool {
        self.automatic_check.unwrap_or_else(|| {
            matches!(Method::parse(&self.verb), Ok(Method::Post)) && self.expected_status() == 201
        })
    }

    /// 请求体模板
    pub fn body_template(&self) -> Result<Option<String>> {
        match &self.body {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Ok(Some(raw.clone())),
            Some(value) => Ok(Some(serde_json::to_string(value)?)),
        }
    }

    /// 日志中使用的名称
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// 对响应的一条检查
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Check {
    #[serde(default)]
    pub description: String,

    /// 取值位置，如 `$.id`、`status`、`headers.Location`
    pub field: String,

    #[serde(default = "default_operator")]
    pub operator: String,

    #[serde(default)]
    pub expected: Value,
}

impl Check {
    pub fn new(
        description: impl Into<String>,
        field: impl Into<String>,
        operator: impl Into<String>,
        expected: Value,
    ) -> Self {
        Self {
            description: description.into(),
            field: field.into(),
            operator: operator.into(),
            expected,
        }
    }
}

/// 分页 GET 的参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "Pagination::default_start_page")]
    pub start_page: i64,

    #[serde(default = "Pagination::default_size")]
    pub size: u32,

    #[serde(default = "Pagination::default_page_parameter")]
    pub page_parameter_name: String,

    #[serde(default = "Pagination::default_size_parameter")]
    pub size_parameter_name: String,

    #[serde(default = "Pagination::default_total_pages_field")]
    pub total_pages_field: String,
}

impl Pagination {
    fn default_start_page() -> i64 {
        1
    }

    fn default_size() -> u32 {
        20
    }

    fn default_page_parameter() -> String {
        "page".to_string()
    }

    fn default_size_parameter() -> String {
        "size".to_string()
    }

    fn default_total_pages_field() -> String {
        "$.totalPages".to_string()
    }

    pub fn new(start_page: i64, size: u32) -> Self {
        Self {
            start_page,
            size,
            ..Self::default()
        }
    }

    pub fn with_parameters(
        mut self,
        page_parameter_name: impl Into<String>,
        size_parameter_name: impl Into<String>,
    ) -> Self {
        self.page_parameter_name = page_parameter_name.into();
        self.size_parameter_name = size_parameter_name.into();
        self
    }

    pub fn with_total_pages_field(mut self, field: impl Into<String>) -> Self {
        self.total_pages_field = field.into();
        self
    }

    /// 从某一页的响应体中读取总页数
    pub fn total_pages(&self, body: &str) -> Result<i64> {
        let path = JsonPath::parse(&self.total_pages_field).map_err(|e| {
            RukiteError::Pagination(format!("invalid total pages field: {}", e))
        })?;
        let value = path
            .read(body)
            .map_err(|e| RukiteError::Pagination(format!("cannot read total pages: {}", e)))?;

        match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            RukiteError::Pagination(format!(
                "total pages field {} is not an integer: {}",
                self.total_pages_field, value
            ))
        })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            start_page: Self::default_start_page(),
            size: Self::default_size(),
            page_parameter_name: Self::default_page_parameter(),
            size_parameter_name: Self::default_size_parameter(),
            total_pages_field: Self::default_total_pages_field(),
        }
    }
}
