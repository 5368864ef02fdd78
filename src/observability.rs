// In: src/observability.rs

//! Logging hooks for the client.
//!
//! Everything in the crate logs through the `log` facade. This module owns the
//! optional `env_logger` installation and the `log_metric!` macro used to emit
//! one structured line per engine call.

use crate::error::Result;
use colored::Colorize;
use log::{Level, LevelFilter};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

/// Filter variable read by `init_from_env`, in `env_logger` syntax.
pub const ENV_LOG: &str = "TDTP_LOG";

/// Logs a structured key-value metric line at `debug` level.
///
/// Nothing is formatted unless `debug` is enabled for the calling module.
///
/// # Example
/// ```ignore
/// log_metric!("event"="engine_call", "symbol"="D_ReadFile", "elapsed_us"=&42);
/// ```
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("TDTP_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide logger at `Info`, optionally appending to `log_file`.
///
/// Only the first call in a process has an effect; a logger installed by the
/// host application is left alone.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);
        install(builder, file);
    });
    Ok(())
}

/// Installs a process-wide logger filtered by `TDTP_LOG` (default `warn`).
pub fn init_from_env() {
    INIT_LOGGER.call_once(|| {
        let env = env_logger::Env::new().filter_or(ENV_LOG, "warn");
        install(env_logger::Builder::from_env(env), None);
    });
}

fn install(mut builder: env_logger::Builder, file: Option<std::fs::File>) {
    let colorize = file.is_none();

    // Custom formatter: just print the level and message
    builder.format(move |buf, record| {
        use std::io::Write;
        let level = record.level().to_string();
        let level = if colorize {
            match record.level() {
                Level::Error => level.red().to_string(),
                Level::Warn => level.yellow().to_string(),
                Level::Info => level.green().to_string(),
                Level::Debug | Level::Trace => level.dimmed().to_string(),
            }
        } else {
            level
        };
        writeln!(buf, "[{}] {}", level, record.args())?;
        buf.flush()?;
        Ok(())
    });

    if let Some(file) = file {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    let _ = builder.try_init();
}
