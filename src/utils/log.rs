//! Log Module

use colored::Colorize;
use std::sync::OnceLock;

static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// This enum is used to represent the different log levels
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Log,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a level name, unknown names map to `Log`
    pub fn from_name(name: &str) -> LogLevel {
        match name {
            "Debug" | "debug" => LogLevel::Debug,
            "Info" | "info" => LogLevel::Info,
            "Log" | "log" => LogLevel::Log,
            "Warn" | "warn" => LogLevel::Warn,
            "Error" | "error" => LogLevel::Error,
            _ => LogLevel::Log,
        }
    }
}

/// Reads the log level from `YCMFLAGS_LOG_LEVEL`, called once on first use
fn init_log_level() -> LogLevel {
    let level = std::env::var("YCMFLAGS_LOG_LEVEL").unwrap_or_else(|_| "Log".to_string());
    LogLevel::from_name(&level)
}

/// Overrides the threshold before the first message is logged.
/// Returns false if the level was already fixed.
pub fn set_log_level(level: LogLevel) -> bool {
    LOG_LEVEL.set(level).is_ok()
}

/// This function is used to log messages to stderr
/// # Arguments
/// * `level` - The log level of the message
/// * `message` - The message to log
/// # Example
/// ```
/// use ycmflags::utils::log::{log, LogLevel};
/// log(LogLevel::Info, "Hello World!");
/// ```
///
/// # Level setting
/// The log level can be set by setting the environment variable `YCMFLAGS_LOG_LEVEL`
/// to one of the following values:
/// * `Debug`
/// * `Info`
/// * `Log`
/// * `Warn`
/// * `Error`
/// If the environment variable is not set, the default log level is `Log`.
/// Stdout is left to flag output, so every message goes to stderr.
pub fn log(level: LogLevel, message: &str) {
    let threshold = *LOG_LEVEL.get_or_init(init_log_level);
    if level < threshold {
        return;
    }
    let level_str = match level {
        LogLevel::Debug => "[DEBUG]".purple(),
        LogLevel::Info => "[INFO]".blue(),
        LogLevel::Log => "[LOG]".green(),
        LogLevel::Warn => "[WARN]".yellow(),
        LogLevel::Error => "[ERROR]".red(),
    };
    eprintln!("{} {}", level_str, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(LogLevel::from_name("Debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Log);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
