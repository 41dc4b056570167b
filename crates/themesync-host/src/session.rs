//! A mounted provider plus bridge, driven by [`HostEvent`]s.

use anyhow::{Context, Result};
use serde::Serialize;
use themesync::{
    Disposition, MessageChannel, ResolvedScheme, RootElement, RootHandle, Scope,
    StyleOverrideBridge, SyncConfig, SystemPreference, ThemeMode, ThemeProvider,
};

use crate::events::HostEvent;

pub struct Session {
    bridge: StyleOverrideBridge,
    provider: ThemeProvider,
    channel: MessageChannel,
    system: SystemPreference,
    root: RootHandle,
}

/// Observable state after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub theme: ThemeMode,
    pub resolved: ResolvedScheme,
    pub color_scheme: ResolvedScheme,
    pub system: Option<bool>,
    pub root: RootElement,
}

impl Session {
    pub fn start(config: SyncConfig, system: SystemPreference) -> Result<Self> {
        let root = RootHandle::new();
        let channel = MessageChannel::new();
        let provider = ThemeProvider::mount(&Scope::root(), root.clone(), system.clone(), config);
        let bridge = provider
            .mount_bridge(&channel)
            .context("failed to mount style override bridge")?;

        Ok(Self {
            bridge,
            provider,
            channel,
            system,
            root,
        })
    }

    /// Applies one event. Messages report what the bridge did with them.
    pub fn apply(&self, event: HostEvent) -> Option<Disposition> {
        tracing::debug!(event = event.label(), "applying host event");
        match event {
            HostEvent::SetTheme { theme } => {
                self.provider.set_theme(theme);
                None
            }
            HostEvent::Resync { theme } => {
                self.provider.set_initial_theme(theme);
                None
            }
            HostEvent::System { prefers_dark } => {
                self.system.set(prefers_dark);
                None
            }
            HostEvent::Refresh => {
                self.system.refresh();
                None
            }
            event @ HostEvent::Message { .. } => {
                let message = event.into_message()?;
                self.channel.post(message);
                self.bridge.last_disposition()
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            theme: self.provider.theme(),
            resolved: self.provider.resolved(),
            color_scheme: self.provider.computed_color_scheme(),
            system: self.system.get(),
            root: self.root.snapshot(),
        }
    }
}
