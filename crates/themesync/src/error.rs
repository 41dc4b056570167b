//! Error types.
//!
//! Only structural mistakes and configuration problems are errors. A missing
//! system preference or a message from an untrusted origin is expected input
//! and is absorbed where it arrives (see [`crate::bridge::Disposition`]).

use std::path::PathBuf;

/// Errors raised by theme wiring.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The theme context was read outside of a [`ThemeProvider`](crate::ThemeProvider).
    #[error("{consumer} must be used within a ThemeProvider")]
    MissingProvider {
        /// Name of the component that asked for the context.
        consumer: &'static str,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ThemeError {
    pub fn missing_provider(consumer: &'static str) -> Self {
        Self::MissingProvider { consumer }
    }
}

/// Errors raised while loading a [`SyncConfig`](crate::SyncConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Failed to parse config{}: {message}", location(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// A trusted origin entry is empty or malformed.
    #[error("Invalid trusted origin '{0}'")]
    InvalidOrigin(String),
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    pub(crate) fn parse(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path,
            message: message.into(),
        }
    }

    /// Attaches a file path to a parse error that has none.
    pub(crate) fn with_path(self, path: PathBuf) -> Self {
        match self {
            ConfigError::Parse {
                path: None,
                message,
            } => ConfigError::Parse {
                path: Some(path),
                message,
            },
            other => other,
        }
    }
}
