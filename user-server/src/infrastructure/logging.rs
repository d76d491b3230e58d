use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::infrastructure::settings::LogFormat;

/// Installs the process-wide subscriber. Called once from `main`.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter);
    let installed = match format {
        LogFormat::Json => builder.with_target(false).json().try_init(),
        LogFormat::Compact => builder.with_target(true).compact().try_init(),
    };

    installed.map_err(|e| anyhow!("failed to init logging: {e}"))
}
