// Infrastructure layer: logging setup and the CLI run

pub mod logging;
pub mod runner;

pub use logging::init_logging;
pub use runner::{run, RunError};
