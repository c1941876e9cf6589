use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::stub::{config::StubConfig, error::StubError};

pub const LOG_FILE_NAME: &str = "echo-fault-stub.log";
const DEFAULT_FILTER: &str = "debug";

/// Install a file-backed subscriber when a log directory is configured
///
/// Standard output and standard error belong to the request, so nothing is
/// ever logged there. Returns `None` when logging is off; the guard must
/// stay alive until the stub terminates.
pub fn init_file_logging(config: &StubConfig) -> Result<Option<WorkerGuard>, StubError> {
    let Some(dir) = &config.log_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir)?;

    let filter = config.log_filter.as_deref().unwrap_or(DEFAULT_FILTER);
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|e| StubError::InvalidConfiguration(format!("Invalid log filter: {}", e)))?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| StubError::InvalidConfiguration(format!("Logging already set up: {}", e)))?;

    Ok(Some(guard))
}
