//! Configuration for qerr.
//!
//! Settings come from, in increasing precedence:
//! - built-in defaults
//! - `config.toml` (`~/.config/qerr/config.toml` or an explicit path)
//! - `QERR_`-prefixed environment variables
//!
//! ```toml
//! [normalizer]
//! message_policy = "omit_absent"
//!
//! [output]
//! pretty = true
//! ```

pub mod env;

pub use env::{EnvError, EnvParser};

use crate::normalizer::{ErrorNormalizer, MessagePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid environment configuration: {}", join_env_errors(.0))]
    Env(Vec<EnvError>),
}

pub(crate) fn join_env_errors(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSection {
    pub message_policy: MessagePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub pretty: bool,
}

/// Complete qerr configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QerrConfig {
    pub normalizer: NormalizerSection,
    pub output: OutputSection,
}

impl QerrConfig {
    /// `~/.config/qerr/config.toml` (platform equivalent), if a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qerr").join("config.toml"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `QERR_MESSAGE_POLICY` and `QERR_PRETTY` overrides.
    pub fn apply_env(&mut self, parser: &mut EnvParser) {
        if let Some(policy) =
            parser.get_parsed::<MessagePolicy>("MESSAGE_POLICY", "always or omit_absent")
        {
            debug!(%policy, "message policy overridden by environment");
            self.normalizer.message_policy = policy;
        }
        if let Some(pretty) = parser.get_bool("PRETTY") {
            self.output.pretty = pretty;
        }
    }

    /// Load file then environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) => Self::from_file(&default)?,
                None => Self::default(),
            },
        };

        let mut parser = EnvParser::new();
        config.apply_env(&mut parser);
        if parser.has_errors() {
            return Err(ConfigError::Env(parser.take_errors()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn normalizer(&self) -> ErrorNormalizer {
        ErrorNormalizer::new().with_message_policy(self.normalizer.message_policy)
    }
}

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
