pub mod loader;
pub mod types;

pub use loader::ScenarioLoader;
pub use types::{Check, Command, Pagination, Scenario};
