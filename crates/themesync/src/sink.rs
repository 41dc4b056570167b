//! The UI library's color-scheme sink.
//!
//! The component library keeps its own notion of the active color scheme.
//! [`ColorSchemeSink`] is the seam through which the sync adapter writes to
//! it. The adapter passes the raw [`ColorScheme`] (`light`, `dark`, or
//! `auto` for `SYSTEM`); resolving `auto` is the library's job.
//!
//! [`LibraryColorScheme`] is the stock implementation. It mirrors the value
//! into a color-scheme attribute on the root element (by default
//! `data-mantine-color-scheme`), and while in `auto` it follows the system
//! preference signal by itself.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::listeners::Subscription;
use crate::mode::{ColorScheme, ResolvedScheme};
use crate::root::RootHandle;
use crate::system::SystemPreference;

/// Attribute written by [`LibraryColorScheme`] unless configured otherwise.
pub const DEFAULT_COLOR_SCHEME_ATTRIBUTE: &str = "data-mantine-color-scheme";

/// Receiver of color-scheme updates.
///
/// Implementations are called from inside event dispatch and must not block.
pub trait ColorSchemeSink {
    /// Stores a new requested scheme and applies it.
    fn set_color_scheme(&self, scheme: ColorScheme);

    /// The scheme most recently requested.
    fn color_scheme(&self) -> ColorScheme;
}

struct LibraryState {
    requested: Cell<ColorScheme>,
    root: RootHandle,
    system: SystemPreference,
    attribute: String,
    fallback: ResolvedScheme,
}

impl LibraryState {
    fn computed(&self) -> ResolvedScheme {
        match self.requested.get() {
            ColorScheme::Auto => self.system.scheme_or(self.fallback),
            ColorScheme::Light => ResolvedScheme::Light,
            ColorScheme::Dark => ResolvedScheme::Dark,
        }
    }

    fn write_attribute(&self) {
        let computed = self.computed();
        self.root
            .borrow_mut()
            .set_attribute(&self.attribute, computed.as_str());
        tracing::debug!(
            attribute = %self.attribute,
            requested = %self.requested.get(),
            %computed,
            "library color scheme applied"
        );
    }
}

/// Color-scheme sink that mirrors its state into a root element attribute.
pub struct LibraryColorScheme {
    state: Rc<LibraryState>,
    _system_subscription: Subscription,
}

impl LibraryColorScheme {
    /// Mounts the sink with the library's default scheme and writes the
    /// attribute immediately.
    ///
    /// `fallback` is the scheme used for `auto` while the system signal is
    /// unavailable.
    pub fn mount(
        root: RootHandle,
        system: SystemPreference,
        attribute: impl Into<String>,
        default_scheme: ColorScheme,
        fallback: ResolvedScheme,
    ) -> Self {
        let state = Rc::new(LibraryState {
            requested: Cell::new(default_scheme),
            root,
            system: system.clone(),
            attribute: attribute.into(),
            fallback,
        });
        state.write_attribute();

        let weak: Weak<LibraryState> = Rc::downgrade(&state);
        let subscription = system.subscribe(move |_| {
            if let Some(state) = weak.upgrade() {
                if state.requested.get() == ColorScheme::Auto {
                    state.write_attribute();
                }
            }
        });

        Self {
            state,
            _system_subscription: subscription,
        }
    }

    /// Mounts with the default attribute name, starting in `auto`.
    pub fn with_defaults(root: RootHandle, system: SystemPreference) -> Self {
        Self::mount(
            root,
            system,
            DEFAULT_COLOR_SCHEME_ATTRIBUTE,
            ColorScheme::Auto,
            ResolvedScheme::Light,
        )
    }

    /// The scheme the library is currently showing.
    pub fn computed_color_scheme(&self) -> ResolvedScheme {
        self.state.computed()
    }

    /// Name of the root attribute this sink writes.
    pub fn attribute(&self) -> &str {
        &self.state.attribute
    }
}

impl ColorSchemeSink for LibraryColorScheme {
    fn set_color_scheme(&self, scheme: ColorScheme) {
        self.state.requested.set(scheme);
        self.state.write_attribute();
    }

    fn color_scheme(&self) -> ColorScheme {
        self.state.requested.get()
    }
}

impl fmt::Debug for LibraryColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryColorScheme")
            .field("attribute", &self.state.attribute)
            .field("requested", &self.state.requested.get())
            .field("computed", &self.state.computed())
            .finish()
    }
}
