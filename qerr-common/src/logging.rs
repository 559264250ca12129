//! Logging setup shared by the qerr binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to binaries via [`init_logging`].
//!
//! # Environment Variables
//!
//! - `QERR_LOG`: level or filter directive (default: caller-supplied)
//! - `QERR_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
//! - `QERR_LOG_FILE`: write logs to this file instead of stderr
//!
//! Bad values are collected by [`LogConfig::from_env`] and reported by
//! [`init_logging`].

use crate::config::env::{EnvError, EnvParser};
use crate::config::join_env_errors;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to create log directory {}: {source}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid logging environment: {}", join_env_errors(.0))]
    Env(Vec<EnvError>),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Where and how to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    env_errors: Vec<EnvError>,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            file: None,
            env_errors: Vec::new(),
        }
    }

    /// Build from `QERR_LOG*` variables, falling back to `default_level`.
    ///
    /// Invalid values fall back to the defaults and are kept in
    /// [`env_errors`](Self::env_errors).
    pub fn from_env(default_level: &str) -> Self {
        let mut parser = EnvParser::new();
        let level = parser
            .get_log_level("LOG")
            .unwrap_or_else(|| default_level.to_string());
        let format = parser
            .get_parsed::<LogFormat>("LOG_FORMAT", "pretty or json")
            .unwrap_or_default();
        let file = parser.get_string("LOG_FILE").map(PathBuf::from);
        Self {
            level,
            format,
            file,
            env_errors: parser.take_errors(),
        }
    }

    pub fn env_errors(&self) -> &[EnvError] {
        &self.env_errors
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Force logging to stderr, dropping any configured file.
    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.file = None;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::Filter {
            filter: self.level.clone(),
            reason: e.to_string(),
        })
    }
}

/// Keeps background log writers alive; drop it last.
#[must_use = "dropping the guards stops file logging"]
#[derive(Default)]
pub struct LoggingGuards {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// Fails before touching the global subscriber if the environment held
/// invalid `QERR_LOG*` values.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards, LoggingError> {
    if !config.env_errors.is_empty() {
        return Err(LoggingError::Env(config.env_errors.clone()));
    }
    let filter = config.filter()?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(config.file.is_none())
                    .with_writer(writer),
            )
            .try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuards { _file: guard })
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard), LoggingError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "qerr.log".into(), |n| n.to_os_string());
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(non_blocking), guard))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::env_test_lock;

    fn clear_log_env() {
        // SAFETY: Tests are serialized via env_test_lock
        unsafe {
            std::env::remove_var("QERR_LOG");
            std::env::remove_var("QERR_LOG_FORMAT");
            std::env::remove_var("QERR_LOG_FILE");
        }
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = env_test_lock();
        clear_log_env();
        let config = LogConfig::from_env("warn");
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = env_test_lock();
        clear_log_env();
        // SAFETY: Tests are serialized via env_test_lock
        unsafe {
            std::env::set_var("QERR_LOG", "qerr_common=trace");
            std::env::set_var("QERR_LOG_FORMAT", "JSON");
            std::env::set_var("QERR_LOG_FILE", "/tmp/qerr-test.log");
        }
        let config = LogConfig::from_env("info");
        clear_log_env();

        assert_eq!(config.level, "qerr_common=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/qerr-test.log")));
        assert!(config.env_errors().is_empty());
        assert!(config.with_stderr().file.is_none());
    }

    #[test]
    fn test_from_env_misspelled_level_reported() {
        let _guard = env_test_lock();
        clear_log_env();
        // SAFETY: Tests are serialized via env_test_lock
        unsafe { std::env::set_var("QERR_LOG", "debgu") };
        let config = LogConfig::from_env("info");
        clear_log_env();

        assert_eq!(config.level, "info");
        assert!(matches!(
            config.env_errors(),
            [EnvError::InvalidLogLevel { var, value }] if var == "QERR_LOG" && value == "debgu"
        ));
        let err = init_logging(&config).err().expect("misspelled level must be rejected");
        assert!(matches!(err, LoggingError::Env(_)));
        assert!(err.to_string().contains("debgu"));
    }

    #[test]
    fn test_from_env_invalid_format_reported() {
        let _guard = env_test_lock();
        clear_log_env();
        // SAFETY: Tests are serialized via env_test_lock
        unsafe { std::env::set_var("QERR_LOG_FORMAT", "xml") };
        let config = LogConfig::from_env("info");
        clear_log_env();

        assert_eq!(config.format, LogFormat::Pretty);
        assert!(matches!(
            config.env_errors(),
            [EnvError::InvalidValue { var, .. }] if var == "QERR_LOG_FORMAT"
        ));
        assert!(matches!(init_logging(&config), Err(LoggingError::Env(_))));
    }

    #[test]
    fn test_builder_methods() {
        let config = LogConfig::new("info")
            .with_level("debug")
            .with_format(LogFormat::Json)
            .with_file("logs/qerr.log");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("logs/qerr.log")));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LogConfig::new("qerr=notalevel");
        assert!(matches!(
            config.filter(),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("Json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
