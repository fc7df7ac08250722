use crate::{Result, RukiteError};

/// 单个检查的错误
///
/// 只有 [`CheckError::Mismatch`] 会被延迟处理，其余错误都会立即中止本条命令的检查。
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// 比较不通过，消息中带有检查描述
    #[error("{0}")]
    Mismatch(String),

    /// 底层断言失败，原样向上抛出
    #[error("{0}")]
    Assertion(String),

    #[error("Unknown check operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CheckError {
    pub fn mismatch(
        description: &str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        CheckError::Mismatch(format!(
            "{} expected [{}] but found [{}]",
            description, expected, actual
        ))
    }
}

/// 一次被记录下来的比较失败
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFailure {
    pub description: String,
    pub message: String,
}

/// 一条命令全部检查的执行结果
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// 已执行的检查数
    pub evaluated: usize,
    /// 按执行顺序排列的比较失败
    pub failures: Vec<CheckFailure>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self) {
        self.evaluated += 1;
    }

    pub fn record_failure(&mut self, description: &str, message: String) {
        self.evaluated += 1;
        self.failures.push(CheckFailure {
            description: description.to_string(),
            message,
        });
    }

    pub fn passed(&self) -> usize {
        self.evaluated - self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn last_failure(&self) -> Option<&CheckFailure> {
        self.failures.last()
    }

    /// 有失败时以最后一个失败的消息作为命令的失败原因
    pub fn into_result(self) -> Result<()> {
        match self.failures.into_iter().last() {
            Some(failure) => Err(RukiteError::CheckFailed(failure.message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_surfaces_last_failure() {
        let mut report = CheckReport::new();
        report.record_failure("first", "M1".to_string());
        report.record_pass();
        report.record_failure("second", "M2".to_string());

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.last_failure().unwrap().description, "second");

        match report.into_result() {
            Err(RukiteError::CheckFailed(msg)) => assert_eq!(msg, "M2"),
            other => panic!("Expected CheckFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_report_is_success() {
        let report = CheckReport::new();
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_mismatch_message_carries_description() {
        let err = CheckError::mismatch("user id", 42, "43");
        assert_eq!(err.to_string(), "user id expected [42] but found [43]");
    }
}
