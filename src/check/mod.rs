/// 检查模块 - 对响应执行命令上声明的检查
mod extractor;
mod operator;
mod runner;
mod types;

pub use extractor::{JsonPath, PathSegment, Selector, as_text, extract_value};
pub use operator::{BuiltinOperator, CheckOperator, OperatorRegistry};
pub use runner::CheckRunner;
pub use types::{CheckError, CheckFailure, CheckReport};
