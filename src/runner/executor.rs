use std::time::Instant;

use tracing::{Instrument, error, info, info_span};

use crate::context::ScenarioContext;
use crate::http::Client;
use crate::runner::command::CommandRunner;
use crate::runner::types::CommandResult;
use crate::scenario::Scenario;

/// 按顺序执行场景中的所有命令
///
/// 第一条命令失败后停止，剩余命令记为未执行。
pub struct ScenarioExecutor {
    runner: CommandRunner,
}

impl ScenarioExecutor {
    pub fn new(client: Client) -> Self {
        Self::with_runner(CommandRunner::new(client))
    }

    pub fn with_runner(runner: CommandRunner) -> Self {
        Self { runner }
    }

    pub async fn execute_all(
        &self,
        scenario: &Scenario,
        context: &mut ScenarioContext,
    ) -> Vec<CommandResult> {
        // 场景变量覆盖配置中的同名设置
        context
            .variables_mut()
            .extend(scenario.variables.iter().map(|(k, v)| (k.clone(), v.clone())));

        let run_id = uuid::Uuid::new_v4();
        let span = info_span!("scenario", %run_id);
        self.run_commands(scenario, context).instrument(span).await
    }

    async fn run_commands(
        &self,
        scenario: &Scenario,
        context: &mut ScenarioContext,
    ) -> Vec<CommandResult> {
        if let Some(description) = &scenario.description {
            info!("Running scenario: {}", description);
        }

        let mut results = Vec::with_capacity(scenario.commands.len());
        let mut failed = false;

        for (index, command) in scenario.commands.iter().enumerate() {
            let number = index + 1;
            let name = command.name.clone();
            let verb = command.verb.to_uppercase();
            let uri = command.uri.clone();

            if failed {
                results.push(CommandResult::not_run(number, name, verb, uri));
                continue;
            }

            let start = Instant::now();
            match self.runner.execute(command, context).await {
                // 禁用的命令由 CommandRunner 跳过，这里只标记结果
                Ok(()) if command.disabled => {
                    results.push(CommandResult::skipped(number, name, verb, uri));
                }
                Ok(()) => {
                    results.push(CommandResult::passed(number, name, verb, uri, start.elapsed()));
                }
                Err(e) => {
                    let message = error_chain(&e);
                    error!("[{}] {}", command.label(), message);
                    failed = true;
                    results.push(CommandResult::failed(
                        number,
                        name,
                        verb,
                        uri,
                        message,
                        start.elapsed(),
                    ));
                }
            }
        }

        results
    }
}

/// 拼接错误及其所有 source
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
