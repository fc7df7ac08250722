use crate::check::{JsonPath, as_text};
use crate::context::ScenarioContext;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// 模板替换器
///
/// 支持的占位符：
/// - `{{name}}` / `{{variable:name}}`：场景变量或配置设置
/// - `{{location:create}}`：命令 `create` 记录的 Location
/// - `{{lookup:create:$.id}}`：命令 `create` 响应体中的值，`%` 表示最近一次响应
/// - `{{uuid}}`、`{{timestamp}}`：同名变量不存在时生成新值
/// - `${ENV_VAR}`：系统环境变量
///
/// 无法解析的占位符保持原样。
pub struct VariableResolver;

impl VariableResolver {
    /// 替换文本中的所有 {{...}} 占位符
    pub fn substitute(text: &str, context: &ScenarioContext) -> String {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            Self::lookup(&caps[1], context).unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
    }

    fn lookup(expr: &str, context: &ScenarioContext) -> Option<String> {
        if let Some((kind, rest)) = expr.split_once(':') {
            let rest = rest.trim();
            return match kind.trim().to_ascii_lowercase().as_str() {
                "variable" => context.variables().get(rest).map(str::to_string),
                "location" => context.location(rest).map(str::to_string),
                "lookup" => {
                    let (name, path) = rest.split_once(':')?;
                    let body = context.body(name.trim())?;
                    let path = JsonPath::parse(path).ok()?;
                    path.read(body).ok().map(|v| as_text(&v))
                }
                _ => None,
            };
        }

        if let Some(value) = context.variables().get(expr) {
            return Some(value.to_string());
        }

        match expr.to_ascii_lowercase().as_str() {
            "uuid" => Some(uuid::Uuid::new_v4().to_string()),
            "timestamp" => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_millis().to_string()),
            _ => None,
        }
    }

    /// 解析并替换系统环境变量 ${VAR}
    pub fn resolve_env_vars(text: &str) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let env_name = &caps[1];
            std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }

    /// 完整的解析流程：先解析环境变量，再替换上下文占位符
    pub fn resolve(text: &str, context: &ScenarioContext) -> String {
        let with_env = Self::resolve_env_vars(text);
        Self::substitute(&with_env, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceRegistry;

    fn context() -> ScenarioContext {
        let mut ctx = ScenarioContext::new(ServiceRegistry::new());
        ctx.variables_mut().insert("base", "users");
        ctx.variables_mut().insert("token", "secret-token");
        ctx
    }

    #[test]
    fn test_substitute_variables() {
        let ctx = context();
        let output = VariableResolver::substitute("/{{base}}?t={{ variable:token }}", &ctx);
        assert_eq!(output, "/users?t=secret-token");
    }

    #[test]
    fn test_substitute_missing_variable() {
        let ctx = context();
        let output = VariableResolver::substitute("{{missing}}/path", &ctx);
        // 未找到的变量保持原样
        assert_eq!(output, "{{missing}}/path");
    }

    #[test]
    fn test_substitute_location_and_lookup() {
        let mut ctx = context();
        ctx.record_body(Some("create"), r#"{"id": 42, "owner": {"name": "bob"}}"#);
        ctx.add_location("create", "http://localhost/users/42");

        assert_eq!(
            VariableResolver::substitute("{{location:create}}", &ctx),
            "http://localhost/users/42"
        );
        assert_eq!(
            VariableResolver::substitute("/users/{{lookup:create:$.id}}", &ctx),
            "/users/42"
        );
        assert_eq!(
            VariableResolver::substitute("{{Lookup:%:$.owner.name}}", &ctx),
            "bob"
        );
        assert_eq!(
            VariableResolver::substitute("{{lookup:create:$.nope}}", &ctx),
            "{{lookup:create:$.nope}}"
        );
    }

    #[test]
    fn test_generated_values() {
        let ctx = context();
        let id = VariableResolver::substitute("{{uuid}}", &ctx);
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let ts = VariableResolver::substitute("{{timestamp}}", &ctx);
        assert!(ts.parse::<u128>().is_ok());
    }

    #[test]
    fn test_variable_shadows_generated_value() {
        let mut ctx = context();
        ctx.variables_mut().insert("uuid", "fixed");
        assert_eq!(VariableResolver::substitute("{{uuid}}", &ctx), "fixed");
    }

    #[test]
    fn test_resolve_env_vars() {
        unsafe {
            std::env::set_var("RUKITE_TEST_VAR", "test_value");
        }

        let output = VariableResolver::resolve_env_vars("Value: ${RUKITE_TEST_VAR}");
        assert_eq!(output, "Value: test_value");

        unsafe {
            std::env::remove_var("RUKITE_TEST_VAR");
        }
    }

    #[test]
    fn test_resolve_env_vars_missing() {
        let input = "Value: ${NONEXISTENT_VAR}";
        let output = VariableResolver::resolve_env_vars(input);
        // 未找到的环境变量保持原样
        assert_eq!(output, "Value: ${NONEXISTENT_VAR}");
    }

    #[test]
    fn test_resolve_combined() {
        unsafe {
            std::env::set_var("RUKITE_API_KEY", "secret-key");
        }

        let ctx = context();
        let output = VariableResolver::resolve("/{{base}}?key=${RUKITE_API_KEY}", &ctx);
        assert_eq!(output, "/users?key=secret-key");

        unsafe {
            std::env::remove_var("RUKITE_API_KEY");
        }
    }
}
