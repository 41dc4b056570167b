//! Property tests: after any sequence of events, both sinks agree with
//! `resolve`.

use proptest::prelude::*;
use themesync::{
    resolve, InboundMessage, MessageChannel, OverrideMessage, ResolvedScheme, RootHandle, Scope,
    SyncConfig, SystemPreference, ThemeMode, ThemeProvider, SCHEME_CLASSES,
};

const ATTR: &str = "data-mantine-color-scheme";
const TRUSTED: &str = "http://localhost";

#[derive(Debug, Clone)]
enum Event {
    SetTheme(ThemeMode),
    System(Option<bool>),
    Message { trusted: bool, mode: ThemeMode },
    Resync(ThemeMode),
}

fn mode() -> impl Strategy<Value = ThemeMode> {
    prop_oneof![
        Just(ThemeMode::Light),
        Just(ThemeMode::Dark),
        Just(ThemeMode::System),
    ]
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        mode().prop_map(Event::SetTheme),
        proptest::option::of(any::<bool>()).prop_map(Event::System),
        (any::<bool>(), mode()).prop_map(|(trusted, mode)| Event::Message { trusted, mode }),
        mode().prop_map(Event::Resync),
    ]
}

fn fallback() -> impl Strategy<Value = ResolvedScheme> {
    prop_oneof![Just(ResolvedScheme::Light), Just(ResolvedScheme::Dark)]
}

proptest! {
    #[test]
    fn sinks_agree_after_every_event(
        initial in mode(),
        prefers_dark in proptest::option::of(any::<bool>()),
        fallback in fallback(),
        events in proptest::collection::vec(event(), 0..40),
    ) {
        let root = RootHandle::new();
        let system = SystemPreference::new(prefers_dark);
        let channel = MessageChannel::new();
        let provider = ThemeProvider::mount(
            &Scope::root(),
            root.clone(),
            system.clone(),
            SyncConfig::default()
                .with_initial_theme(initial)
                .with_system_fallback(fallback)
                .with_self_origin(TRUSTED),
        );
        let _bridge = provider.mount_bridge(&channel).unwrap();

        let mut expected_mode = initial;
        for event in events {
            match event {
                Event::SetTheme(mode) => {
                    provider.set_theme(mode);
                    expected_mode = mode;
                }
                Event::System(value) => {
                    system.set(value);
                }
                Event::Message { trusted, mode } => {
                    let origin = if trusted { TRUSTED } else { "https://other.example" };
                    let message: InboundMessage = OverrideMessage::theme(mode).from_origin(origin);
                    channel.post(message);
                    if trusted {
                        expected_mode = mode;
                    }
                }
                Event::Resync(mode) => {
                    if provider.set_initial_theme(mode) {
                        expected_mode = mode;
                    }
                }
            }

            let prefers_dark = system.scheme_or(fallback).is_dark();
            let expected = resolve(expected_mode, prefers_dark);

            let snapshot = root.snapshot();
            let markers: Vec<&String> = snapshot
                .classes()
                .iter()
                .filter(|c| SCHEME_CLASSES.contains(&c.as_str()))
                .collect();

            prop_assert_eq!(provider.theme(), expected_mode);
            prop_assert_eq!(markers.len(), 1);
            prop_assert_eq!(markers[0].as_str(), expected.as_str());
            prop_assert_eq!(snapshot.attribute(ATTR), Some(expected.as_str()));
        }
    }
}
