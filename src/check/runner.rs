use tracing::{debug, warn};

use crate::check::extractor::{Selector, extract_value};
use crate::check::operator::OperatorRegistry;
use crate::check::types::{CheckError, CheckReport};
use crate::http::Response;
use crate::scenario::Check;
use crate::utils::log_payloads;
use crate::{Result, RukiteError};

/// 按顺序对响应执行一组检查
///
/// - 比较失败：记录下来并继续执行剩余检查
/// - 断言失败：立即中止，原样返回
/// - 其他错误：立即中止，包装为 `Check [<description>] failed`
///
/// 每种失败之前都会先输出请求与响应内容。
#[derive(Debug, Clone, Default)]
pub struct CheckRunner {
    registry: OperatorRegistry,
}

impl CheckRunner {
    pub fn new(registry: OperatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn run(
        &self,
        checks: &[Check],
        response: &Response,
        request_body: Option<&str>,
    ) -> Result<CheckReport> {
        let mut report = CheckReport::new();

        for check in checks {
            match self.verify(check, response) {
                Ok(()) => {
                    debug!(check = %check.description, "check passed");
                    report.record_pass();
                }
                Err(CheckError::Mismatch(message)) => {
                    log_payloads(request_body, response);
                    warn!(check = %check.description, "{}", message);
                    report.record_failure(&check.description, message);
                }
                Err(CheckError::Assertion(message)) => {
                    log_payloads(request_body, response);
                    return Err(RukiteError::CheckAssertion(message));
                }
                Err(source) => {
                    log_payloads(request_body, response);
                    return Err(RukiteError::CheckAborted {
                        description: check.description.clone(),
                        source,
                    });
                }
            }
        }

        Ok(report)
    }

    fn verify(&self, check: &Check, response: &Response) -> std::result::Result<(), CheckError> {
        let operator = self.registry.resolve(&check.operator)?;
        let selector = Selector::parse(&check.field)?;
        let actual = extract_value(response, &selector)?;
        operator.apply(&actual, &check.expected, &check.description)
    }
}
