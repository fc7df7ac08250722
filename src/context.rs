//! 一次运行内的共享状态
//!
//! 保存每条命令的响应体快照、创建资源的 Location、自由设置以及服务注册表。
//! 在运行开始时创建，运行结束时丢弃，通过 `&mut` 显式传递给每条命令。

use std::collections::HashMap;

use serde_json::Value;

use crate::scenario::Check;
use crate::service::ServiceRegistry;
use crate::variable::{VariableContext, VariableResolver};

/// 最近一次响应体使用的键
pub const LATEST_KEY: &str = "%";

/// 控制是否打印响应的设置项
pub const LOG_REQUEST_SETTING: &str = "logRequest";

#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    bodies: HashMap<String, String>,
    locations: HashMap<String, String>,
    variables: VariableContext,
    services: ServiceRegistry,
}

impl ScenarioContext {
    pub fn new(services: ServiceRegistry) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }

    pub fn with_variables(mut self, variables: VariableContext) -> Self {
        self.variables = variables;
        self
    }

    /// 记录响应体快照
    ///
    /// 空响应体不记录。非空时总是覆盖 `%`，命名命令额外按名称保存。
    pub fn record_body(&mut self, name: Option<&str>, body: &str) {
        if body.is_empty() {
            return;
        }
        self.bodies.insert(LATEST_KEY.to_string(), body.to_string());
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.bodies.insert(name.to_string(), body.to_string());
        }
    }

    pub fn body(&self, key: &str) -> Option<&str> {
        self.bodies.get(key).map(String::as_str)
    }

    pub fn latest_body(&self) -> Option<&str> {
        self.body(LATEST_KEY)
    }

    pub fn add_location(&mut self, name: impl Into<String>, location: impl Into<String>) {
        self.locations.insert(name.into(), location.into());
    }

    pub fn location(&self, name: &str) -> Option<&str> {
        self.locations.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &VariableContext {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableContext {
        &mut self.variables
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// 未设置 logRequest 时默认打印
    pub fn must_log(&self) -> bool {
        self.variables.get_bool(LOG_REQUEST_SETTING).unwrap_or(true)
    }

    /// 展开文本中的占位符
    pub fn resolve(&self, text: &str) -> String {
        VariableResolver::resolve(text, self)
    }

    /// 返回占位符已展开的检查副本，原检查不变
    pub fn resolve_checks(&self, checks: &[Check]) -> Vec<Check> {
        checks
            .iter()
            .map(|check| {
                let expected = match &check.expected {
                    Value::String(s) => Value::String(self.resolve(s)),
                    other => other.clone(),
                };
                Check {
                    description: check.description.clone(),
                    field: self.resolve(&check.field),
                    operator: check.operator.clone(),
                    expected,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_body_named_and_latest() {
        let mut ctx = ScenarioContext::default();
        ctx.record_body(Some("create"), r#"{"id":1}"#);
        ctx.record_body(None, r#"{"id":2}"#);

        assert_eq!(ctx.body("create"), Some(r#"{"id":1}"#));
        assert_eq!(ctx.latest_body(), Some(r#"{"id":2}"#));
    }

    #[test]
    fn test_record_empty_body_is_ignored() {
        let mut ctx = ScenarioContext::default();
        ctx.record_body(Some("create"), r#"{"id":1}"#);
        ctx.record_body(Some("create"), "");

        assert_eq!(ctx.body("create"), Some(r#"{"id":1}"#));
        assert_eq!(ctx.latest_body(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn test_record_body_ignores_empty_name() {
        let mut ctx = ScenarioContext::default();
        ctx.record_body(Some(""), "{}");

        assert_eq!(ctx.body(""), None);
        assert_eq!(ctx.latest_body(), Some("{}"));
    }

    #[test]
    fn test_locations() {
        let mut ctx = ScenarioContext::default();
        assert_eq!(ctx.location("create"), None);
        ctx.add_location("create", "http://localhost/users/1");
        assert_eq!(ctx.location("create"), Some("http://localhost/users/1"));
    }

    #[test]
    fn test_must_log() {
        let mut ctx = ScenarioContext::default();
        assert!(ctx.must_log());
        ctx.variables_mut().insert(LOG_REQUEST_SETTING, "false");
        assert!(!ctx.must_log());
        ctx.variables_mut().insert(LOG_REQUEST_SETTING, "true");
        assert!(ctx.must_log());
    }

    #[test]
    fn test_resolve_checks_leaves_originals_untouched() {
        let mut ctx = ScenarioContext::default();
        ctx.variables_mut().insert("owner", "alice");
        ctx.variables_mut().insert("key", "name");

        let checks = vec![
            Check::new("owner", "$.{{key}}", "equals", json!("{{owner}}")),
            Check::new("count", "$.items", "size", json!(3)),
        ];
        let resolved = ctx.resolve_checks(&checks);

        assert_eq!(resolved[0].field, "$.name");
        assert_eq!(resolved[0].expected, json!("alice"));
        assert_eq!(resolved[1].expected, json!(3));
        assert_eq!(checks[0].field, "$.{{key}}");
    }
}
