use crate::runner::types::{CommandOutcome, CommandResult, RunSummary};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 控制台输出
pub struct RunReporter {
    verbose: bool,
}

impl RunReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印运行开始
    pub fn print_header(&self, file_path: &str, total: usize) {
        println!(
            "\nRunning {} commands from {}...\n",
            total,
            file_path.bold()
        );
    }

    /// 打印单条命令结果
    pub fn print_result(&self, result: &CommandResult) {
        let name_part = match &result.name {
            Some(name) => format!(" {} -", name),
            None => String::new(),
        };

        match &result.outcome {
            CommandOutcome::Skipped => println!(
                " {} [{}]{} {} {} {}",
                "⊘".dimmed(),
                result.index,
                name_part,
                result.verb.cyan(),
                result.uri,
                "(disabled)".dimmed()
            ),
            CommandOutcome::NotRun => {
                if self.verbose {
                    println!(
                        " {} [{}]{} {} {} {}",
                        "·".dimmed(),
                        result.index,
                        name_part,
                        result.verb.cyan(),
                        result.uri,
                        "(not run)".dimmed()
                    );
                }
            }
            CommandOutcome::Passed => println!(
                " {} [{}]{} {} {} ({}ms)",
                "✓".green(),
                result.index,
                name_part,
                result.verb.cyan(),
                result.uri,
                result.duration.as_millis()
            ),
            CommandOutcome::Failed(error) => {
                println!(
                    " {} [{}]{} {} {} ({}ms)",
                    "✗".red(),
                    result.index,
                    name_part,
                    result.verb.cyan(),
                    result.uri,
                    result.duration.as_millis()
                );
                println!("   {}: {}", "Error".red().bold(), error);
                println!();
            }
        }
    }

    /// 以表格形式打印所有命令
    pub fn print_table(&self, results: &[CommandResult]) {
        println!("{}", Self::build_table(results));
    }

    fn build_table(results: &[CommandResult]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["#", "Name", "Verb", "URI", "Result", "Duration"]);

        for result in results {
            let (label, color) = match &result.outcome {
                CommandOutcome::Passed => ("passed", Color::Green),
                CommandOutcome::Failed(_) => ("failed", Color::Red),
                CommandOutcome::Skipped => ("disabled", Color::DarkGrey),
                CommandOutcome::NotRun => ("not run", Color::DarkGrey),
            };

            table.add_row(vec![
                Cell::new(result.index),
                Cell::new(result.name.as_deref().unwrap_or("-")),
                Cell::new(&result.verb),
                Cell::new(&result.uri).add_attribute(Attribute::Dim),
                Cell::new(label).fg(color),
                Cell::new(format!("{}ms", result.duration.as_millis())),
            ]);
        }

        table
    }

    /// 打印运行摘要
    pub fn print_summary(&self, summary: &RunSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        let mut parts = vec![format!("{} passed", summary.passed.to_string().green())];
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed.to_string().red()));
        }
        if summary.skipped > 0 {
            parts.push(format!("{} disabled", summary.skipped.to_string().dimmed()));
        }
        if summary.not_run > 0 {
            parts.push(format!("{} not run", summary.not_run.to_string().yellow()));
        }
        parts.push(format!("{} total", summary.total));
        println!("  {}: {}", "Commands".bold(), parts.join(", "));

        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_table_lists_every_command() {
        let results = vec![
            CommandResult::passed(
                1,
                Some("create".to_string()),
                "POST".to_string(),
                "/users".to_string(),
                Duration::from_millis(12),
            ),
            CommandResult::not_run(2, None, "GET".to_string(), "/users/{{id}}".to_string()),
        ];

        let rendered = RunReporter::build_table(&results).to_string();
        assert!(rendered.contains("create"));
        assert!(rendered.contains("passed"));
        assert!(rendered.contains("not run"));
        assert!(rendered.contains("/users/{{id}}"));
    }
}
