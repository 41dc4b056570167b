//! Provider configuration.
//!
//! [`SyncConfig`] gathers the few knobs a host tunes: the initial mode, the
//! scheme assumed when the system preference is unavailable, the library's
//! color-scheme attribute, the override message type and the trusted
//! origins. Every field has a default, so an empty document is a valid
//! configuration.
//!
//! ```rust
//! use themesync::{ResolvedScheme, SyncConfig, ThemeMode};
//!
//! let config = SyncConfig::from_yaml(r#"
//! initial_theme: DARK
//! system_fallback: dark
//! self_origin: "http://localhost:5173"
//! trusted_origins:
//!   - "https://studio.example"
//! "#).unwrap();
//!
//! assert_eq!(config.initial_theme, ThemeMode::Dark);
//! assert_eq!(config.system_fallback, ResolvedScheme::Dark);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bridge::{OriginPolicy, DEFAULT_MESSAGE_TYPE};
use crate::error::ConfigError;
use crate::mode::{ResolvedScheme, ThemeMode};
use crate::sink::DEFAULT_COLOR_SCHEME_ATTRIBUTE;

/// Settings for a [`ThemeProvider`](crate::ThemeProvider) and its bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Mode applied at mount.
    pub initial_theme: ThemeMode,
    /// Scheme assumed for `SYSTEM` when the host cannot report a preference.
    pub system_fallback: ResolvedScheme,
    /// Root attribute written by the library color-scheme sink.
    pub color_scheme_attribute: String,
    /// `type` field of style override messages.
    pub message_type: String,
    /// The page's own origin. Messages from it are trusted.
    pub self_origin: Option<String>,
    /// Additional trusted origins. `"*"` trusts every sender.
    pub trusted_origins: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            initial_theme: ThemeMode::System,
            system_fallback: ResolvedScheme::Light,
            color_scheme_attribute: DEFAULT_COLOR_SCHEME_ATTRIBUTE.to_string(),
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            self_origin: None,
            trusted_origins: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Parses YAML. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::parse(None, e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::parse(None, e.to_string()))
    }

    /// Loads a file, choosing the format by extension (`.json` for JSON,
    /// anything else as YAML).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        };
        parsed.map_err(|e| e.with_path(path.to_path_buf()))
    }

    /// Builds the origin policy described by `self_origin` and
    /// `trusted_origins`.
    pub fn origin_policy(&self) -> Result<OriginPolicy, ConfigError> {
        OriginPolicy::from_entries(self.self_origin.as_deref(), self.trusted_origins.as_slice())
    }

    pub fn with_initial_theme(mut self, mode: ThemeMode) -> Self {
        self.initial_theme = mode;
        self
    }

    pub fn with_system_fallback(mut self, fallback: ResolvedScheme) -> Self {
        self.system_fallback = fallback;
        self
    }

    pub fn with_self_origin(mut self, origin: impl Into<String>) -> Self {
        self.self_origin = Some(origin.into());
        self
    }

    pub fn trust_origin(mut self, origin: impl Into<String>) -> Self {
        self.trusted_origins.push(origin.into());
        self
    }
}
