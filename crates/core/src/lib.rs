// Resume Match Core - Domain Logic, Ports & Workflow
// NO infrastructure dependencies: HTTP and filesystem live in adapter crates

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
