use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use rukite::context::ScenarioContext;
use rukite::http::Client;
use rukite::runner::{RunReporter, RunSummary, ScenarioExecutor};
use rukite::scenario::ScenarioLoader;
use rukite::variable::{ConfigLoader, RunConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行一个 JSON 场景文件
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// 场景文件路径
    pub path: PathBuf,

    /// 配置文件，缺省时自动查找 rukite.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 使用的环境名称
    #[arg(short, long)]
    pub env: Option<String>,

    /// 变量覆盖，格式 key=value，可重复
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// 输出每条命令（包括未执行的）
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    fn cli_vars(&self) -> Result<Vec<(String, String)>> {
        self.vars
            .iter()
            .map(|raw| match ConfigLoader::parse_cli_var(raw) {
                Some(pair) => Ok(pair),
                None => bail!("invalid --var '{}', expected KEY=VALUE", raw),
            })
            .collect()
    }

    fn load_config(&self) -> Result<RunConfig> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_path(path)
                .with_context(|| format!("cannot load {}", path.display())),
            None => Ok(ConfigLoader::find_and_load()?.unwrap_or_default()),
        }
    }
}

/// 执行场景，全部命令通过时返回 true
pub async fn run(args: RunArgs) -> Result<bool> {
    let config = args.load_config()?;
    let cli_vars = args.cli_vars()?;

    let settings = ConfigLoader::build_settings(&config, args.env.as_deref(), &cli_vars)?;
    let registry = ConfigLoader::build_registry(&config)?;
    info!("{} service(s) configured", registry.len());

    let scenario = ScenarioLoader::load_file(&args.path)?;

    let client = match config.timeout_secs {
        Some(secs) => Client::with_timeout(Duration::from_secs(secs))?,
        None => Client::new()?,
    };

    let reporter = RunReporter::new(args.verbose);
    reporter.print_header(&args.path.display().to_string(), scenario.commands.len());

    let mut context = ScenarioContext::new(registry).with_variables(settings);
    let results = ScenarioExecutor::new(client)
        .execute_all(&scenario, &mut context)
        .await;

    for result in &results {
        reporter.print_result(result);
    }
    if args.verbose {
        reporter.print_table(&results);
    }

    let summary = RunSummary::from_results(&results);
    reporter.print_summary(&summary);
    Ok(summary.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "rukite",
            "run",
            "scenario.json",
            "--env",
            "dev",
            "--var",
            "token=abc",
            "--var",
            "id=7",
            "-v",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command;
        assert_eq!(args.path, PathBuf::from("scenario.json"));
        assert_eq!(args.env.as_deref(), Some("dev"));
        assert!(args.verbose);
        assert_eq!(
            args.cli_vars().unwrap(),
            vec![
                ("token".to_string(), "abc".to_string()),
                ("id".to_string(), "7".to_string())
            ]
        );
    }

    #[test]
    fn test_invalid_var_is_rejected() {
        let cli = Cli::try_parse_from(["rukite", "run", "s.json", "--var", "novalue"]).unwrap();
        let Commands::Run(args) = cli.command;
        assert!(args.cli_vars().is_err());
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["rukite", "run"]).is_err());
    }
}
