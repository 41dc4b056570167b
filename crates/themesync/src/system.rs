//! System color-scheme preference.
//!
//! The host environment owns the "system prefers dark" signal. This crate
//! only observes it through [`SystemPreference`], an observable cell that
//! the host updates whenever the OS reports a change (or on a poll, via
//! [`SystemPreference::refresh`]).
//!
//! The signal is tri-state: `Some(true)` for dark, `Some(false)` for light
//! and `None` when the host cannot report a preference. Consumers decide
//! what `None` means; the sync adapter maps it to a configured fallback.
//!
//! # Detection
//!
//! [`detect_system_preference`] asks the OS through the `dark-light` crate.
//! Override it for testing with [`set_preference_detector`]:
//!
//! ```rust
//! use themesync::{detect_system_preference, set_preference_detector};
//!
//! set_preference_detector(|| Some(true));
//! assert_eq!(detect_system_preference(), Some(true));
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Mutex;

use dark_light::Mode as OsMode;
use once_cell::sync::Lazy;

use crate::listeners::{Listeners, Subscription};
use crate::mode::ResolvedScheme;

type PreferenceDetector = fn() -> Option<bool>;

static PREFERENCE_DETECTOR: Lazy<Mutex<PreferenceDetector>> =
    Lazy::new(|| Mutex::new(os_preference_detector));

/// Overrides the detector used by [`detect_system_preference`].
///
/// The detector returns `Some(true)` when the system prefers dark,
/// `Some(false)` for light and `None` when no preference is available.
pub fn set_preference_detector(detector: PreferenceDetector) {
    let mut guard = PREFERENCE_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = detector;
}

/// Restores the OS-backed detector.
pub fn reset_preference_detector() {
    set_preference_detector(os_preference_detector);
}

/// Detects whether the system prefers a dark color scheme.
///
/// Returns `None` when the platform cannot report a preference or the
/// query fails. Detection never errors.
pub fn detect_system_preference() -> Option<bool> {
    let detector = *PREFERENCE_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    detector()
}

fn os_preference_detector() -> Option<bool> {
    match dark_light::detect() {
        Ok(OsMode::Dark) => Some(true),
        Ok(OsMode::Light) => Some(false),
        Ok(OsMode::Unspecified) => None,
        Err(err) => {
            tracing::debug!(error = ?err, "system color scheme detection failed");
            None
        }
    }
}

/// Observable "system prefers dark" signal.
///
/// Clones share the same underlying value and subscribers.
#[derive(Clone)]
pub struct SystemPreference {
    value: Rc<Cell<Option<bool>>>,
    listeners: Listeners<Option<bool>>,
}

impl SystemPreference {
    /// Creates a signal with a known starting value.
    pub fn new(prefers_dark: Option<bool>) -> Self {
        Self {
            value: Rc::new(Cell::new(prefers_dark)),
            listeners: Listeners::new(),
        }
    }

    /// Creates a signal for a host that cannot report a preference.
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    /// Creates a signal seeded from [`detect_system_preference`].
    pub fn detect() -> Self {
        Self::new(detect_system_preference())
    }

    /// Current value of the signal.
    pub fn get(&self) -> Option<bool> {
        self.value.get()
    }

    /// Current preference as a scheme, using `fallback` when unavailable.
    pub fn scheme_or(&self, fallback: ResolvedScheme) -> ResolvedScheme {
        match self.get() {
            Some(prefers_dark) => ResolvedScheme::from_prefers_dark(prefers_dark),
            None => fallback,
        }
    }

    /// Updates the signal and notifies subscribers if the value changed.
    ///
    /// Returns `true` when subscribers were notified.
    pub fn set(&self, prefers_dark: Option<bool>) -> bool {
        if self.value.replace(prefers_dark) == prefers_dark {
            return false;
        }
        tracing::debug!(?prefers_dark, "system color scheme preference changed");
        self.listeners.notify(&prefers_dark);
        true
    }

    /// Re-runs detection and publishes the result.
    pub fn refresh(&self) -> bool {
        self.set(detect_system_preference())
    }

    /// Subscribes to changes. The callback receives the new value.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<bool>) + 'static,
    {
        self.listeners.subscribe(move |value| callback(*value))
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for SystemPreference {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl fmt::Debug for SystemPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemPreference")
            .field("prefers_dark", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::cell::RefCell;

    #[test]
    #[serial]
    fn test_detector_override() {
        set_preference_detector(|| Some(true));
        assert_eq!(detect_system_preference(), Some(true));

        set_preference_detector(|| None);
        assert_eq!(detect_system_preference(), None);

        reset_preference_detector();
    }

    #[test]
    #[serial]
    fn test_detect_seeds_signal() {
        set_preference_detector(|| Some(false));
        let signal = SystemPreference::detect();
        assert_eq!(signal.get(), Some(false));
        reset_preference_detector();
    }

    #[test]
    #[serial]
    fn test_refresh_publishes_detected_value() {
        set_preference_detector(|| Some(false));
        let signal = SystemPreference::detect();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            signal.subscribe(move |v| seen.borrow_mut().push(v))
        };

        set_preference_detector(|| Some(true));
        assert!(signal.refresh());
        assert!(!signal.refresh());

        assert_eq!(*seen.borrow(), vec![Some(true)]);
        reset_preference_detector();
    }

    #[test]
    fn test_set_only_notifies_on_change() {
        let signal = SystemPreference::new(Some(false));
        let count = Rc::new(Cell::new(0));
        let _sub = {
            let count = Rc::clone(&count);
            signal.subscribe(move |_| count.set(count.get() + 1))
        };

        assert!(!signal.set(Some(false)));
        assert!(signal.set(Some(true)));
        assert!(signal.set(None));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_scheme_or_uses_fallback_when_unavailable() {
        let signal = SystemPreference::unavailable();
        assert_eq!(signal.scheme_or(ResolvedScheme::Light), ResolvedScheme::Light);
        assert_eq!(signal.scheme_or(ResolvedScheme::Dark), ResolvedScheme::Dark);

        signal.set(Some(true));
        assert_eq!(signal.scheme_or(ResolvedScheme::Light), ResolvedScheme::Dark);
    }

    #[test]
    fn test_clones_share_state() {
        let signal = SystemPreference::new(Some(false));
        let other = signal.clone();
        other.set(Some(true));
        assert_eq!(signal.get(), Some(true));
    }
}
