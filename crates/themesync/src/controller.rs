//! Theme state and its scoped capability handle.
//!
//! [`ThemeController`] owns the user's [`ThemeMode`]. Descendants never see
//! the controller itself; they receive a [`ThemeHandle`] (read the mode,
//! set the mode, subscribe to changes) through a [`Scope`].
//!
//! # Scopes
//!
//! A [`Scope`] is an explicit dependency-injection handle passed down to
//! whatever needs the theme. [`Scope::provide`] returns a child scope that
//! carries a handle; a nested provider shadows the outer one rather than
//! merging with it. Reading the theme from a scope that has no provider is
//! a wiring mistake and fails with [`ThemeError::MissingProvider`]:
//!
//! ```rust
//! use themesync::{Scope, ThemeController, ThemeMode};
//!
//! let controller = ThemeController::new(ThemeMode::Light);
//! let scope = Scope::root().provide(controller.handle());
//!
//! let theme = scope.theme().unwrap();
//! theme.set_theme(ThemeMode::Dark);
//! assert_eq!(controller.theme(), ThemeMode::Dark);
//!
//! assert!(Scope::root().theme().is_err());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::ThemeError;
use crate::listeners::{Listeners, Subscription};
use crate::mode::ThemeMode;

struct ThemeState {
    mode: Cell<ThemeMode>,
    initial: Cell<ThemeMode>,
    listeners: Listeners<ThemeMode>,
}

/// Read/write capability over a controller's theme mode.
///
/// Cheap to clone; all clones address the same state.
#[derive(Clone)]
pub struct ThemeHandle {
    state: Rc<ThemeState>,
}

impl ThemeHandle {
    /// The current user preference. `SYSTEM` is reported as-is.
    pub fn theme(&self) -> ThemeMode {
        self.state.mode.get()
    }

    /// Replaces the stored mode.
    ///
    /// Subscribers are notified synchronously before this returns. Setting
    /// the mode that is already stored changes nothing and notifies no one.
    pub fn set_theme(&self, mode: ThemeMode) {
        let previous = self.state.mode.replace(mode);
        if previous == mode {
            tracing::trace!(%mode, "theme unchanged");
            return;
        }
        tracing::debug!(from = %previous, to = %mode, "theme mode changed");
        self.state.listeners.notify(&mode);
    }

    /// Subscribes to mode changes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ThemeMode) + 'static,
    {
        self.state.listeners.subscribe(move |mode| callback(*mode))
    }

    /// Returns true if both handles belong to the same controller.
    pub fn ptr_eq(&self, other: &ThemeHandle) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ThemeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeHandle")
            .field("theme", &self.theme())
            .field("subscribers", &self.state.listeners.len())
            .finish()
    }
}

/// Owner of a theme mode.
///
/// The caller supplies an initial mode at construction. That initial value
/// is also a resync point: when the host later supplies a different initial
/// value through [`sync_initial_theme`](Self::sync_initial_theme), it is
/// applied to the stored mode.
#[derive(Debug)]
pub struct ThemeController {
    handle: ThemeHandle,
}

impl ThemeController {
    pub fn new(initial: ThemeMode) -> Self {
        Self {
            handle: ThemeHandle {
                state: Rc::new(ThemeState {
                    mode: Cell::new(initial),
                    initial: Cell::new(initial),
                    listeners: Listeners::new(),
                }),
            },
        }
    }

    /// A capability handle for descendants.
    pub fn handle(&self) -> ThemeHandle {
        self.handle.clone()
    }

    pub fn theme(&self) -> ThemeMode {
        self.handle.theme()
    }

    pub fn set_theme(&self, mode: ThemeMode) {
        self.handle.set_theme(mode)
    }

    /// The most recent externally supplied initial mode.
    pub fn initial_theme(&self) -> ThemeMode {
        self.handle.state.initial.get()
    }

    /// Records a new externally supplied initial mode.
    ///
    /// If it differs from the previously supplied one, it replaces the
    /// stored mode (even if the user changed the mode in between). Returns
    /// `true` when the supplied value was new.
    pub fn sync_initial_theme(&self, initial: ThemeMode) -> bool {
        let state = &self.handle.state;
        if state.initial.replace(initial) == initial {
            return false;
        }
        tracing::debug!(%initial, "initial theme changed, resyncing");
        self.handle.set_theme(initial);
        true
    }
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

/// Scoped context through which descendants reach a [`ThemeHandle`].
#[derive(Debug, Clone, Default)]
pub struct Scope {
    theme: Option<ThemeHandle>,
}

impl Scope {
    /// A scope with no provider.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a child scope carrying `handle`, shadowing any outer provider.
    pub fn provide(&self, handle: ThemeHandle) -> Scope {
        Scope {
            theme: Some(handle),
        }
    }

    /// The nearest provider's handle.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::MissingProvider`] if no provider is in scope.
    pub fn theme(&self) -> Result<ThemeHandle, ThemeError> {
        self.theme_for("use_theme")
    }

    /// Like [`theme`](Self::theme), naming `consumer` in the error.
    pub fn theme_for(&self, consumer: &'static str) -> Result<ThemeHandle, ThemeError> {
        self.theme
            .clone()
            .ok_or_else(|| ThemeError::missing_provider(consumer))
    }
}

/// Reads the theme capability from `scope`.
pub fn use_theme(scope: &Scope) -> Result<ThemeHandle, ThemeError> {
    scope.theme()
}
