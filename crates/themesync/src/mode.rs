//! Theme modes and scheme resolution.
//!
//! Three related values flow through the crate:
//!
//! - [`ThemeMode`]: what the user asked for (`LIGHT`, `DARK` or `SYSTEM`).
//! - [`ResolvedScheme`]: what is actually shown (`light` or `dark`).
//! - [`ColorScheme`]: what the UI library's color-scheme sink is told. This is
//!   the raw mode for `LIGHT`/`DARK` and the `auto` sentinel for `SYSTEM`, so
//!   the library can follow the system preference on its own.
//!
//! [`resolve`] is the only place a `ResolvedScheme` is produced. It is a pure
//! function of the mode and the system preference, so nothing stores a
//! resolved scheme as independent truth.
//!
//! ```rust
//! use themesync::{resolve, ResolvedScheme, ThemeMode};
//!
//! assert_eq!(resolve(ThemeMode::System, true), ResolvedScheme::Dark);
//! assert_eq!(resolve(ThemeMode::Light, true), ResolvedScheme::Light);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The user's theme preference.
///
/// Serialized as `"LIGHT"`, `"DARK"` or `"SYSTEM"`, which is also the form
/// carried by `theme` override messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThemeMode {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
}

impl ThemeMode {
    /// All modes, in declaration order.
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    /// The value handed to the library color-scheme sink for this mode.
    pub fn color_scheme(self) -> ColorScheme {
        match self {
            ThemeMode::Light => ColorScheme::Light,
            ThemeMode::Dark => ColorScheme::Dark,
            ThemeMode::System => ColorScheme::Auto,
        }
    }

    /// Returns the wire name (`"LIGHT"`, `"DARK"`, `"SYSTEM"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "LIGHT",
            ThemeMode::Dark => "DARK",
            ThemeMode::System => "SYSTEM",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode or scheme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    input: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme mode '{}'", self.input)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for ThemeMode {
    type Err = ParseModeError;

    /// Parses a mode name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ThemeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseModeError {
                input: s.to_string(),
            })
    }
}

/// The concrete two-state scheme applied to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedScheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedScheme {
    /// Class token and attribute value for this scheme.
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedScheme::Light => "light",
            ResolvedScheme::Dark => "dark",
        }
    }

    /// Maps a "prefers dark" flag onto a scheme.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ResolvedScheme::Dark
        } else {
            ResolvedScheme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == ResolvedScheme::Dark
    }
}

impl fmt::Display for ResolvedScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolvedScheme {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ResolvedScheme::Light),
            "dark" => Ok(ResolvedScheme::Dark),
            _ => Err(ParseModeError {
                input: s.to_string(),
            }),
        }
    }
}

/// Value written into the UI library's color-scheme sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Let the library follow the system preference.
    Auto,
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Auto => "auto",
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    /// Resolves the sink value the way the library does: `auto` follows the
    /// system preference, anything else is taken literally.
    pub fn resolve(self, system_prefers_dark: bool) -> ResolvedScheme {
        match self {
            ColorScheme::Auto => ResolvedScheme::from_prefers_dark(system_prefers_dark),
            ColorScheme::Light => ResolvedScheme::Light,
            ColorScheme::Dark => ResolvedScheme::Dark,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a theme mode against the system preference.
pub fn resolve(mode: ThemeMode, system_prefers_dark: bool) -> ResolvedScheme {
    match mode {
        ThemeMode::Dark => ResolvedScheme::Dark,
        ThemeMode::Light => ResolvedScheme::Light,
        ThemeMode::System => ResolvedScheme::from_prefers_dark(system_prefers_dark),
    }
}
