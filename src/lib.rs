pub mod check;
pub mod context;
pub mod error;
pub mod http;
pub mod logger;
pub mod runner;
pub mod scenario;
pub mod service;
pub mod utils;
pub mod variable;

// Re-export commonly used types
pub use context::ScenarioContext;
pub use error::{Result, RukiteError};
