//! Logging and run observability.

mod logging;
mod timing;

pub use logging::{setup_logging, LogFormat};
pub use timing::RunTimer;
