use std::time::Duration;

/// 单条命令的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Passed,
    Failed(String),
    /// 命令被禁用
    Skipped,
    /// 之前的命令失败，未执行
    NotRun,
}

/// 单条命令的执行结果
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// 命令序号（从 1 开始）
    pub index: usize,

    pub name: Option<String>,

    pub verb: String,

    /// 未展开的 URI 模板
    pub uri: String,

    pub outcome: CommandOutcome,

    /// 执行耗时，包括 wait
    pub duration: Duration,
}

impl CommandResult {
    pub fn passed(
        index: usize,
        name: Option<String>,
        verb: String,
        uri: String,
        duration: Duration,
    ) -> Self {
        Self {
            index,
            name,
            verb,
            uri,
            outcome: CommandOutcome::Passed,
            duration,
        }
    }

    pub fn failed(
        index: usize,
        name: Option<String>,
        verb: String,
        uri: String,
        error: String,
        duration: Duration,
    ) -> Self {
        Self {
            index,
            name,
            verb,
            uri,
            outcome: CommandOutcome::Failed(error),
            duration,
        }
    }

    pub fn skipped(index: usize, name: Option<String>, verb: String, uri: String) -> Self {
        Self {
            index,
            name,
            verb,
            uri,
            outcome: CommandOutcome::Skipped,
            duration: Duration::ZERO,
        }
    }

    pub fn not_run(index: usize, name: Option<String>, verb: String, uri: String) -> Self {
        Self {
            index,
            name,
            verb,
            uri,
            outcome: CommandOutcome::NotRun,
            duration: Duration::ZERO,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CommandOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CommandOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// 运行摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub not_run: usize,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn from_results(results: &[CommandResult]) -> Self {
        let count = |wanted: fn(&CommandOutcome) -> bool| {
            results.iter().filter(|r| wanted(&r.outcome)).count()
        };

        Self {
            total: results.len(),
            passed: count(|o| matches!(o, CommandOutcome::Passed)),
            failed: count(|o| matches!(o, CommandOutcome::Failed(_))),
            skipped: count(|o| matches!(o, CommandOutcome::Skipped)),
            not_run: count(|o| matches!(o, CommandOutcome::NotRun)),
            total_duration: results.iter().map(|r| r.duration).sum(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
