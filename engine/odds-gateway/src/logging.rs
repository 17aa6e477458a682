//! Logging and tracing setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging from `RUST_LOG` (default `info`) and `LOG_FORMAT`
pub fn initialize_logging() -> Result<()> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    initialize_logging_with_format(&format)
}

/// Initialize logging with an explicit output format (`json`, `pretty` or plain)
pub fn initialize_logging_with_format(format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match format {
        "json" => fmt::layer().json().with_target(true).with_current_span(false).boxed(),
        "pretty" => fmt::layer().pretty().with_target(false).with_ansi(true).boxed(),
        _ => fmt::layer().with_target(false).with_line_number(true).with_ansi(true).boxed(),
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    Ok(())
}
