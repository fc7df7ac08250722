mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 初始化日志系统
    rukite::logger::init_logger("info");

    let cli = Cli::parse();
    let passed = match cli.command {
        Commands::Run(args) => cli::run(args).await?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
