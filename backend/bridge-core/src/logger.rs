//! Logging setup for applications embedding the bridge.
//!
//! Colored stdout always; a plain-text file alongside it when a log
//! directory is supplied. Initialization is guarded so calling it from both
//! the application and a test harness is harmless.

use crate::error::logger::LoggerError;

use common::ErrorLocation;

use std::io::stdout;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "bridge.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Initialize the global logger.
///
/// Safe to call more than once: the second and later calls log a warning
/// through the already-installed logger and return `Ok`.
///
/// # Errors
///
/// Returns [`LoggerError::Init`] if the log file cannot be created or the
/// dispatch cannot be installed.
pub fn initialize(log_dir: Option<&Path>) -> Result<(), LoggerError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!("Logger initialized with level {LOG_LEVEL:?}");
        }
    });

    result
}

fn initialize_internal(log_dir: Option<&Path>) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig::new()
        .trace(Magenta)
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                message = message,
                target = record.target(),
            ))
        })
        .chain(stdout());

    let mut root = Dispatch::new().level(LOG_LEVEL).chain(stdout_dispatch);

    if let Some(dir) = log_dir {
        let log_file = fern::log_file(dir.join(LOG_FILE_NAME)).map_err(|e| LoggerError::Init {
            message: format!("failed to create log file in {}: {e}", dir.display()),
            location: ErrorLocation::capture(),
        })?;

        let file_dispatch = Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{date} - {level}] {message} [{target}]",
                    date = format_rfc3339(SystemTime::now()),
                    level = record.level(),
                    message = message,
                    target = record.target(),
                ))
            })
            .chain(log_file);

        root = root.chain(file_dispatch);
    }

    root.apply().map_err(|e| LoggerError::Init {
        message: format!("logger dispatch failed: {e}"),
        location: ErrorLocation::capture(),
    })
}
