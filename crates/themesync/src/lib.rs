//! # themesync - Light/Dark/System Theme Synchronization
//!
//! `themesync` keeps a page's color scheme consistent across the places that
//! need to know about it. A user picks one of three [`ThemeMode`]s; the
//! crate resolves `SYSTEM` against the OS preference and writes the result
//! to the UI library's color-scheme sink and to the root element's class
//! list, in the same synchronous step.
//!
//! ## Core Concepts
//!
//! - [`ThemeMode`]: the user's preference (`LIGHT`, `DARK`, `SYSTEM`)
//! - [`ResolvedScheme`]: the concrete `light`/`dark` scheme, via [`resolve`]
//! - [`ThemeController`] / [`ThemeHandle`]: owner of the mode and the
//!   capability handed to descendants through a [`Scope`]
//! - [`SystemPreference`]: observable OS preference signal
//! - [`ThemeSyncAdapter`]: pushes the resolved scheme to both sinks
//! - [`StyleOverrideBridge`]: applies `VIBE_STYLE_OVERRIDE` messages from
//!   trusted origins
//! - [`ThemeProvider`]: all of the above, mounted together from a [`SyncConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use themesync::{
//!     MessageChannel, OverrideMessage, RootHandle, Scope, SyncConfig, SystemPreference,
//!     ThemeMode, ThemeProvider,
//! };
//!
//! let root = RootHandle::new();
//! let system = SystemPreference::new(Some(false));
//! let config = SyncConfig::default()
//!     .with_initial_theme(ThemeMode::Light)
//!     .with_self_origin("http://localhost");
//!
//! let provider = ThemeProvider::mount(&Scope::root(), root.clone(), system.clone(), config);
//! assert!(root.borrow().has_class("light"));
//!
//! // Descendants reach the theme through the scope.
//! let theme = provider.scope().theme().unwrap();
//! theme.set_theme(ThemeMode::System);
//!
//! // The OS switches to dark: both sinks follow.
//! system.set(Some(true));
//! assert!(root.borrow().has_class("dark"));
//! assert_eq!(root.borrow().attribute("data-mantine-color-scheme"), Some("dark"));
//!
//! // An embedding host restyles the page.
//! let channel = MessageChannel::new();
//! let _bridge = provider.mount_bridge(&channel).unwrap();
//! channel.post(OverrideMessage::css_vars([("--accent", "#123456")]).from_origin("http://localhost"));
//! assert_eq!(root.borrow().style_property("--accent"), Some("#123456"));
//! ```
//!
//! ## Threading
//!
//! Everything here is single-threaded. Notifications are delivered
//! synchronously, so each event (a `set_theme` call, a system preference
//! change, an inbound message) is fully applied before the next one starts.

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod controller;
mod error;
pub mod listeners;
pub mod mode;
pub mod provider;
pub mod root;
pub mod sink;
pub mod system;

// Error types
pub use error::{ConfigError, ThemeError};

// Mode and resolution
pub use mode::{resolve, ColorScheme, ParseModeError, ResolvedScheme, ThemeMode};

// State and scope
pub use controller::{use_theme, Scope, ThemeController, ThemeHandle};
pub use listeners::Subscription;

// System preference
pub use system::{
    detect_system_preference, reset_preference_detector, set_preference_detector,
    SystemPreference,
};

// Sinks and synchronization
pub use adapter::{ThemeSyncAdapter, SCHEME_CLASSES};
pub use root::{RootElement, RootHandle};
pub use sink::{ColorSchemeSink, LibraryColorScheme, DEFAULT_COLOR_SCHEME_ATTRIBUTE};

// Style overrides
pub use bridge::{
    Disposition, IgnoreReason, InboundMessage, MessageChannel, OriginPolicy, OverrideMessage,
    OverridePayload, StyleOverrideBridge, DEFAULT_MESSAGE_TYPE,
};

// Composition
pub use config::SyncConfig;
pub use provider::ThemeProvider;
