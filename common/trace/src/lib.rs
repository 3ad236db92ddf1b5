pub mod global_logging;

pub use tracing::{debug, error, info, instrument, trace, warn};
pub use tracing_appender::non_blocking::WorkerGuard;
