use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::check::extractor::as_text;
use crate::check::types::CheckError;

/// 可插拔的比较策略
///
/// 比较不通过时应返回 [`CheckError::Mismatch`]，消息中带上 `description`。
pub trait CheckOperator: Send + Sync {
    /// 名称是否匹配（大小写不敏感）
    fn matches(&self, name: &str) -> bool;

    fn apply(&self, actual: &Value, expected: &Value, description: &str)
    -> Result<(), CheckError>;
}

/// 内置运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Size,
}

impl BuiltinOperator {
    pub const ALL: [BuiltinOperator; 6] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::GreaterThan,
        Self::LessThan,
        Self::Size,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notequals",
            Self::Contains => "contains",
            Self::GreaterThan => "gt",
            Self::LessThan => "lt",
            Self::Size => "size",
        }
    }

    /// 符号别名
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Contains => "contains",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for BuiltinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn numbers(actual: &Value, expected: &Value) -> Result<(f64, f64), CheckError> {
    let a = as_number(actual).ok_or_else(|| CheckError::TypeMismatch {
        expected: "number".to_string(),
        actual: type_name(actual).to_string(),
    })?;
    let e = as_number(expected).ok_or_else(|| CheckError::TypeMismatch {
        expected: "number".to_string(),
        actual: type_name(expected).to_string(),
    })?;
    Ok((a, e))
}

impl CheckOperator for BuiltinOperator {
    fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        name.eq_ignore_ascii_case(self.name()) || name == self.symbol()
    }

    fn apply(
        &self,
        actual: &Value,
        expected: &Value,
        description: &str,
    ) -> Result<(), CheckError> {
        let passed = match self {
            // 按文本比较，"42" 与 42 视为相等
            Self::Equals => as_text(actual) == as_text(expected),
            Self::NotEquals => as_text(actual) != as_text(expected),
            Self::Contains => match actual {
                Value::String(s) => s.contains(&as_text(expected)),
                Value::Array(items) => {
                    let wanted = as_text(expected);
                    items.iter().any(|item| as_text(item) == wanted)
                }
                Value::Object(map) => map.contains_key(&as_text(expected)),
                other => {
                    return Err(CheckError::TypeMismatch {
                        expected: "string, array or object".to_string(),
                        actual: type_name(other).to_string(),
                    });
                }
            },
            Self::GreaterThan => {
                let (a, e) = numbers(actual, expected)?;
                a > e
            }
            Self::LessThan => {
                let (a, e) = numbers(actual, expected)?;
                a < e
            }
            Self::Size => {
                let len = match actual {
                    Value::String(s) => s.chars().count(),
                    Value::Array(items) => items.len(),
                    Value::Object(map) => map.len(),
                    other => {
                        return Err(CheckError::TypeMismatch {
                            expected: "string, array or object".to_string(),
                            actual: type_name(other).to_string(),
                        });
                    }
                };
                let (_, e) = numbers(&Value::from(len), expected)?;
                if len as f64 != e {
                    return Err(CheckError::mismatch(
                        description,
                        format!("size {}", as_text(expected)),
                        format!("size {}", len),
                    ));
                }
                true
            }
        };

        if passed {
            Ok(())
        } else {
            let expected = match self {
                Self::Equals => as_text(expected),
                _ => format!("{} {}", self.symbol(), as_text(expected)),
            };
            Err(CheckError::mismatch(description, expected, as_text(actual)))
        }
    }
}

/// 运算符注册表
///
/// 按注册顺序查找第一个匹配的运算符，内置运算符优先。
#[derive(Clone)]
pub struct OperatorRegistry {
    operators: Vec<Arc<dyn CheckOperator>>,
}

impl OperatorRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            operators: Vec::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for op in BuiltinOperator::ALL {
            registry.register(op);
        }
        registry
    }

    pub fn register<O: CheckOperator + 'static>(&mut self, operator: O) {
        self.operators.push(Arc::new(operator));
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// 没有匹配的运算符时返回 [`CheckError::UnknownOperator`]
    pub fn resolve(&self, name: &str) -> Result<&dyn CheckOperator, CheckError> {
        self.operators
            .iter()
            .find(|op| op.matches(name))
            .map(|op| &**op)
            .ok_or_else(|| CheckError::UnknownOperator(name.to_string()))
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.operators.len())
            .finish()
    }
}
