pub mod command;
pub mod executor;
pub mod reporter;
pub mod types;

pub use command::CommandRunner;
pub use executor::ScenarioExecutor;
pub use reporter::RunReporter;
pub use types::{CommandOutcome, CommandResult, RunSummary};
