//! Theme provider: the composed theme subtree.
//!
//! [`ThemeProvider::mount`] wires the pieces together the way an
//! application root needs them:
//!
//! 1. a [`ThemeController`] seeded with the configured initial mode,
//! 2. a [`LibraryColorScheme`] sink that starts in `auto`,
//! 3. a [`ThemeSyncAdapter`] linking the two with the root element,
//! 4. a child [`Scope`] that carries the controller's handle.
//!
//! Mounting returns the provider rather than taking a callback; callers
//! pass [`scope`](ThemeProvider::scope) on to whatever needs the theme.
//!
//! ```rust
//! use themesync::{RootHandle, Scope, SyncConfig, SystemPreference, ThemeMode, ThemeProvider};
//!
//! let root = RootHandle::new();
//! let provider = ThemeProvider::mount(
//!     &Scope::root(),
//!     root.clone(),
//!     SystemPreference::new(Some(true)),
//!     SyncConfig::default().with_initial_theme(ThemeMode::Light),
//! );
//! assert!(root.borrow().has_class("light"));
//!
//! provider.scope().theme().unwrap().set_theme(ThemeMode::System);
//! assert!(root.borrow().has_class("dark"));
//! assert_eq!(root.borrow().attribute("data-mantine-color-scheme"), Some("dark"));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::adapter::ThemeSyncAdapter;
use crate::bridge::{MessageChannel, StyleOverrideBridge};
use crate::config::SyncConfig;
use crate::controller::{Scope, ThemeController, ThemeHandle};
use crate::error::ThemeError;
use crate::mode::{ColorScheme, ResolvedScheme, ThemeMode};
use crate::root::RootHandle;
use crate::sink::LibraryColorScheme;
use crate::system::SystemPreference;

/// A mounted theme subtree.
pub struct ThemeProvider {
    adapter: ThemeSyncAdapter,
    library: Rc<LibraryColorScheme>,
    controller: ThemeController,
    scope: Scope,
    root: RootHandle,
    config: SyncConfig,
}

impl ThemeProvider {
    /// Mounts a provider below `parent`.
    pub fn mount(
        parent: &Scope,
        root: RootHandle,
        system: SystemPreference,
        config: SyncConfig,
    ) -> Self {
        let controller = ThemeController::new(config.initial_theme);
        let library = Rc::new(LibraryColorScheme::mount(
            root.clone(),
            system.clone(),
            config.color_scheme_attribute.clone(),
            ColorScheme::Auto,
            config.system_fallback,
        ));
        let adapter = ThemeSyncAdapter::mount(
            controller.handle(),
            system,
            library.clone(),
            root.clone(),
            config.system_fallback,
        );
        let scope = parent.provide(controller.handle());

        tracing::info!(
            initial = %config.initial_theme,
            resolved = %adapter.resolved(),
            "theme provider mounted"
        );

        Self {
            adapter,
            library,
            controller,
            scope,
            root,
            config,
        }
    }

    /// The scope descendants read the theme from.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn handle(&self) -> ThemeHandle {
        self.controller.handle()
    }

    pub fn theme(&self) -> ThemeMode {
        self.controller.theme()
    }

    pub fn set_theme(&self, mode: ThemeMode) {
        self.controller.set_theme(mode)
    }

    /// Re-renders the provider with a (possibly new) initial mode.
    ///
    /// See [`ThemeController::sync_initial_theme`].
    pub fn set_initial_theme(&self, mode: ThemeMode) -> bool {
        self.controller.sync_initial_theme(mode)
    }

    /// The scheme reflected in the root class list.
    pub fn resolved(&self) -> ResolvedScheme {
        self.adapter.resolved()
    }

    /// The scheme the library sink reports.
    pub fn computed_color_scheme(&self) -> ResolvedScheme {
        self.library.computed_color_scheme()
    }

    pub fn root(&self) -> &RootHandle {
        &self.root
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Mounts a style override bridge in this provider's scope, using the
    /// configured message type and origin policy.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Config`] if a trusted origin is malformed.
    pub fn mount_bridge(&self, channel: &MessageChannel) -> Result<StyleOverrideBridge, ThemeError> {
        let policy = self.config.origin_policy()?;
        StyleOverrideBridge::mount(
            &self.scope,
            self.root.clone(),
            channel,
            policy,
            &self.config.message_type,
        )
    }

    /// Tears the subtree down. The root element keeps its last state.
    pub fn unmount(self) {
        tracing::debug!("theme provider unmounted");
    }
}

impl fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeProvider")
            .field("theme", &self.theme())
            .field("resolved", &self.resolved())
            .field("library", &self.library)
            .finish()
    }
}
