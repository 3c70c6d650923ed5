//! Routing of the adapter's `log` records to a host-provided sink.

use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can receive the adapter's log messages.
///
/// The adapter logs through the `log` facade. Hosts that want those messages (for example the
/// browser console, or a telemetry pipe) implement this trait and install it once with
/// [`set_logger`].
///
/// # Examples
///
/// ```rust
/// use embedded_wallet_core::logger::{Logger, LogLevel};
///
/// struct MyLogger;
///
/// impl Logger for MyLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{:?}] {}", level, message);
///     }
/// }
/// ```
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Enumeration of possible log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Designates very low priority, often extremely detailed messages.
    Trace,
    /// Designates lower priority debugging information.
    Debug,
    /// Designates informational messages that highlight the progress of the adapter.
    Info,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates error events that might still allow the adapter to continue running.
    Error,
}

/// Forwards `log` records to the user-provided `Logger`.
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.module_path(), record.level()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded when they come from this workspace.
fn should_forward(module_path: Option<&str>, level: log::Level) -> bool {
    let is_from_adapter =
        module_path.is_some_and(|path| path.starts_with("embedded_wallet"));
    let is_debug_or_trace = level == log::Level::Debug || level == log::Level::Trace;
    !is_debug_or_trace || is_from_adapter
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Only the first call installs a logger; later calls are reported on stderr and ignored.
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_all_levels_from_adapter() {
        for level in [log::Level::Trace, log::Level::Debug, log::Level::Error] {
            assert!(should_forward(
                Some("embedded_wallet_core::adapter"),
                level
            ));
        }
    }

    #[test]
    fn test_drops_verbose_records_from_dependencies() {
        assert!(!should_forward(Some("reqwest::connect"), log::Level::Debug));
        assert!(!should_forward(None, log::Level::Trace));
        assert!(should_forward(Some("reqwest::connect"), log::Level::Warn));
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Info), LogLevel::Info);
    }
}
