//! Theme synchronization adapter.
//!
//! [`ThemeSyncAdapter`] turns the user's [`ThemeMode`] into a concrete
//! [`ResolvedScheme`] and pushes it to two places:
//!
//! 1. the library [`ColorSchemeSink`], which receives the raw mode (or
//!    `auto` for `SYSTEM`) so it can follow the system on its own,
//! 2. the root element class list, which carries exactly one of the
//!    `light` / `dark` tokens for styling systems that cannot see the
//!    library's state.
//!
//! ## Recomputation
//!
//! The adapter subscribes to the theme handle and to the system preference
//! signal when it mounts. Either notification re-runs the same routine,
//! which performs both writes before returning. Since notifications are
//! dispatched synchronously, no other event is processed between the two
//! writes and readers never observe the sinks disagreeing.
//!
//! ```text
//!  set_theme ──┐
//!              ├─► resolve(mode, system) ─► sink.set_color_scheme(mode.color_scheme())
//!  system ─────┘                         └► root: remove light/dark, add resolved
//! ```
//!
//! ## Unavailable system preference
//!
//! When the system signal reports `None`, `SYSTEM` resolves to the
//! configured fallback scheme instead of failing.
//!
//! Dropping the adapter (or calling [`unmount`](ThemeSyncAdapter::unmount))
//! removes both subscriptions.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::controller::ThemeHandle;
use crate::listeners::Subscription;
use crate::mode::{resolve, ResolvedScheme, ThemeMode};
use crate::root::RootHandle;
use crate::sink::ColorSchemeSink;
use crate::system::SystemPreference;

/// Class tokens owned by the adapter.
pub const SCHEME_CLASSES: [&str; 2] = ["light", "dark"];

struct AdapterState {
    handle: ThemeHandle,
    system: SystemPreference,
    sink: Rc<dyn ColorSchemeSink>,
    root: RootHandle,
    fallback: ResolvedScheme,
    resolved: Cell<ResolvedScheme>,
    applications: Cell<u64>,
}

impl AdapterState {
    fn apply(&self) -> ResolvedScheme {
        let mode = self.handle.theme();
        let prefers_dark = self.system.scheme_or(self.fallback).is_dark();
        let resolved = resolve(mode, prefers_dark);

        self.sink.set_color_scheme(mode.color_scheme());
        {
            let mut root = self.root.borrow_mut();
            root.remove_classes(&SCHEME_CLASSES);
            root.add_class(resolved.as_str());
        }

        self.resolved.set(resolved);
        self.applications.set(self.applications.get() + 1);
        tracing::debug!(
            %mode,
            system = ?self.system.get(),
            %resolved,
            "theme synchronized"
        );
        resolved
    }
}

/// Keeps the library sink and the root class list in step with the theme.
pub struct ThemeSyncAdapter {
    state: Rc<AdapterState>,
    subscriptions: Vec<Subscription>,
}

impl ThemeSyncAdapter {
    /// Mounts the adapter: applies the current mode, then subscribes to
    /// theme and system changes.
    ///
    /// `fallback` is used for `SYSTEM` while the system signal is
    /// unavailable.
    pub fn mount(
        handle: ThemeHandle,
        system: SystemPreference,
        sink: Rc<dyn ColorSchemeSink>,
        root: RootHandle,
        fallback: ResolvedScheme,
    ) -> Self {
        let state = Rc::new(AdapterState {
            handle: handle.clone(),
            system: system.clone(),
            sink,
            root,
            fallback,
            resolved: Cell::new(fallback),
            applications: Cell::new(0),
        });
        state.apply();

        let on_theme = {
            let weak: Weak<AdapterState> = Rc::downgrade(&state);
            handle.subscribe(move |_| {
                if let Some(state) = weak.upgrade() {
                    state.apply();
                }
            })
        };
        let on_system = {
            let weak: Weak<AdapterState> = Rc::downgrade(&state);
            system.subscribe(move |_| {
                if let Some(state) = weak.upgrade() {
                    state.apply();
                }
            })
        };

        Self {
            state,
            subscriptions: vec![on_theme, on_system],
        }
    }

    /// The scheme applied by the most recent recomputation.
    pub fn resolved(&self) -> ResolvedScheme {
        self.state.resolved.get()
    }

    /// The user preference the adapter is tracking.
    pub fn theme(&self) -> ThemeMode {
        self.state.handle.theme()
    }

    /// The handle the adapter exposes to descendants.
    pub fn handle(&self) -> ThemeHandle {
        self.state.handle.clone()
    }

    /// Re-runs the resolution and both writes.
    pub fn resync(&self) -> ResolvedScheme {
        self.state.apply()
    }

    /// Number of recomputations so far, including the one at mount.
    pub fn applications(&self) -> u64 {
        self.state.applications.get()
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Removes the theme and system subscriptions. The root element keeps
    /// its last class marker.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.subscriptions.is_empty() {
            tracing::trace!("theme sync adapter unmounted");
            self.subscriptions.clear();
        }
    }
}

impl Drop for ThemeSyncAdapter {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ThemeSyncAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeSyncAdapter")
            .field("theme", &self.theme())
            .field("resolved", &self.resolved())
            .field("fallback", &self.state.fallback)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
