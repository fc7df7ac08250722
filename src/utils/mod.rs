pub mod formatter;

pub use formatter::{ResponseFormat, ResponseFormatter, log_payloads, pretty_body};
