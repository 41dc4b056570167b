//! Host event script format.
//!
//! One JSON object per line, tagged by `event`:
//!
//! ```text
//! {"event":"setTheme","theme":"DARK"}
//! {"event":"resync","theme":"LIGHT"}
//! {"event":"system","prefersDark":true}
//! {"event":"system","prefersDark":null}
//! {"event":"refresh"}
//! {"event":"message","origin":"http://localhost","data":{...}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result};
use serde::Deserialize;
use themesync::{InboundMessage, ThemeMode};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", deny_unknown_fields)]
pub enum HostEvent {
    /// A component calls `set_theme`.
    SetTheme { theme: ThemeMode },
    /// The host re-renders the provider with a new initial theme.
    Resync { theme: ThemeMode },
    /// The OS reports a new preference (`null` when unavailable).
    System {
        #[serde(rename = "prefersDark", default)]
        prefers_dark: Option<bool>,
    },
    /// Re-detect the OS preference.
    Refresh,
    /// A cross-context message arrives.
    Message {
        origin: String,
        data: serde_json::Value,
    },
}

impl HostEvent {
    pub fn label(&self) -> &'static str {
        match self {
            HostEvent::SetTheme { .. } => "setTheme",
            HostEvent::Resync { .. } => "resync",
            HostEvent::System { .. } => "system",
            HostEvent::Refresh => "refresh",
            HostEvent::Message { .. } => "message",
        }
    }

    pub fn into_message(self) -> Option<InboundMessage> {
        match self {
            HostEvent::Message { origin, data } => Some(InboundMessage::new(origin, data)),
            _ => None,
        }
    }
}

/// Parses one script line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_event_line(line: &str) -> Result<Option<HostEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let event = serde_json::from_str(trimmed).context("invalid host event")?;
    Ok(Some(event))
}
