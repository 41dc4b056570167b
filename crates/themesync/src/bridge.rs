//! Cross-context style override messages.
//!
//! An embedding host (a parent frame, a preview pane) can restyle the page
//! by posting messages of this shape:
//!
//! ```json
//! { "type": "VIBE_STYLE_OVERRIDE",
//!   "payload": { "kind": "cssVars", "variables": { "--accent": "#123456" } } }
//!
//! { "type": "VIBE_STYLE_OVERRIDE",
//!   "payload": { "kind": "theme", "theme": "DARK" } }
//! ```
//!
//! [`StyleOverrideBridge`] listens on a [`MessageChannel`] and, for each
//! message from a trusted origin:
//!
//! - `cssVars`: writes each custom property onto the root element's inline
//!   style, replacing earlier values. There is no removal command. Each
//!   entry is checked on its own: a name that is not a plain custom property,
//!   or a value that is not a string confined to one declaration, is skipped
//!   while the rest of the message still applies.
//! - `theme`: forwards the mode to the theme handle, exactly as if
//!   `set_theme` had been called directly.
//!
//! Everything else is dropped without error: untrusted origins, messages of
//! another `type`, unknown `kind` values and malformed payloads. The result
//! of each message is reported as a [`Disposition`].
//!
//! # Trust
//!
//! Message content ends up in the document's style, so origins are checked
//! before anything is parsed. [`OriginPolicy`] trusts the page's own origin
//! and an explicit allow-list. The `*` wildcard exists for broadcast
//! channels that are trusted as a whole, and must be opted into.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::controller::{Scope, ThemeHandle};
use crate::error::{ConfigError, ThemeError};
use crate::listeners::{Listeners, Subscription};
use crate::mode::ThemeMode;
use crate::root::RootHandle;

/// `type` of style override messages unless configured otherwise.
pub const DEFAULT_MESSAGE_TYPE: &str = "VIBE_STYLE_OVERRIDE";

/// Body of a style override message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OverridePayload {
    /// Custom properties to set on the root element.
    ///
    /// Values are decoded loosely so that one bad entry is skipped on its
    /// own instead of rejecting the whole message.
    #[serde(rename = "cssVars")]
    CssVars {
        variables: BTreeMap<String, serde_json::Value>,
    },

    /// Theme mode to forward to the controller.
    #[serde(rename = "theme")]
    Theme { theme: ThemeMode },

    /// Any other `kind`. Ignored.
    #[serde(other)]
    Unknown,
}

/// A style override message as posted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: OverridePayload,
}

impl OverrideMessage {
    pub fn css_vars<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            payload: OverridePayload::CssVars {
                variables: variables
                    .into_iter()
                    .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
                    .collect(),
            },
        }
    }

    pub fn theme(theme: ThemeMode) -> Self {
        Self {
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            payload: OverridePayload::Theme { theme },
        }
    }

    /// Wraps the message as it would arrive from `origin`.
    pub fn from_origin(&self, origin: impl Into<String>) -> InboundMessage {
        InboundMessage {
            origin: origin.into(),
            data: serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// A message delivered over the cross-context channel.
///
/// `data` is untrusted and arbitrary; it is only decoded after the origin
/// has been accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub origin: String,
    pub data: serde_json::Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Why a message was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IgnoreReason {
    /// The sender's origin is not trusted.
    UntrustedOrigin,
    /// The message is not a style override.
    OtherMessageType,
    /// The payload `kind` is not recognized.
    UnknownKind,
    /// The payload could not be decoded.
    Malformed,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IgnoreReason::UntrustedOrigin => "untrusted origin",
            IgnoreReason::OtherMessageType => "other message type",
            IgnoreReason::UnknownKind => "unknown kind",
            IgnoreReason::Malformed => "malformed payload",
        };
        f.write_str(text)
    }
}

/// What the bridge did with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Disposition {
    /// Custom properties were written; `skipped` counts entries with a
    /// rejected name or value.
    CssVarsApplied { applied: usize, skipped: usize },
    /// The theme mode was forwarded to the controller.
    ThemeForwarded { theme: ThemeMode },
    /// The message was dropped.
    Ignored { reason: IgnoreReason },
}

impl Disposition {
    fn ignored(reason: IgnoreReason) -> Self {
        Disposition::Ignored { reason }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Disposition::Ignored { .. })
    }
}

/// Which origins may send override messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    self_origin: Option<String>,
    trusted: Vec<String>,
    allow_any: bool,
}

impl OriginPolicy {
    /// A policy that trusts nobody.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts messages from the page's own origin.
    pub fn same_origin(origin: &str) -> Self {
        Self {
            self_origin: Some(normalize_origin(origin)),
            ..Self::default()
        }
    }

    /// Adds an origin to the allow-list.
    pub fn trust(mut self, origin: &str) -> Self {
        self.trusted.push(normalize_origin(origin));
        self
    }

    /// Trusts every sender. Only for channels whose senders are all trusted.
    pub fn allow_any(mut self) -> Self {
        self.allow_any = true;
        self
    }

    /// Builds a policy from configuration entries.
    ///
    /// `"*"` enables [`allow_any`](Self::allow_any). Other entries must look
    /// like `scheme://host[:port]`.
    pub fn from_entries<S: AsRef<str>>(
        self_origin: Option<&str>,
        entries: &[S],
    ) -> Result<Self, ConfigError> {
        let mut policy = match self_origin {
            Some(origin) => {
                validate_origin(origin)?;
                Self::same_origin(origin)
            }
            None => Self::new(),
        };
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry == "*" {
                tracing::warn!("style override bridge trusts every origin");
                policy = policy.allow_any();
            } else {
                validate_origin(entry)?;
                policy = policy.trust(entry);
            }
        }
        Ok(policy)
    }

    pub fn is_trusted(&self, origin: &str) -> bool {
        if self.allow_any {
            return true;
        }
        let origin = normalize_origin(origin);
        self.self_origin.as_deref() == Some(origin.as_str())
            || self.trusted.iter().any(|trusted| *trusted == origin)
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let normalized = normalize_origin(origin);
    let valid = normalized
        .split_once("://")
        .map(|(scheme, host)| !scheme.is_empty() && !host.is_empty() && !host.contains('/'))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidOrigin(origin.to_string()))
    }
}

/// The environment's generic cross-context message channel.
///
/// Clones share subscribers. [`post`](Self::post) delivers synchronously.
#[derive(Debug, Clone, Default)]
pub struct MessageChannel {
    listeners: Listeners<InboundMessage>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, message: InboundMessage) {
        self.listeners.notify(&message);
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&InboundMessage) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

struct BridgeState {
    theme: ThemeHandle,
    root: RootHandle,
    policy: OriginPolicy,
    message_type: String,
    last: RefCell<Option<Disposition>>,
}

impl BridgeState {
    fn handle(&self, message: &InboundMessage) -> Disposition {
        let disposition = self.dispatch(message);
        match &disposition {
            Disposition::Ignored {
                reason: IgnoreReason::UntrustedOrigin,
            } => {
                tracing::warn!(origin = %message.origin, "dropped style override from untrusted origin");
            }
            Disposition::Ignored { reason } => {
                tracing::debug!(origin = %message.origin, %reason, "ignored message");
            }
            applied => {
                tracing::debug!(origin = %message.origin, ?applied, "style override applied");
            }
        }
        *self.last.borrow_mut() = Some(disposition.clone());
        disposition
    }

    fn dispatch(&self, message: &InboundMessage) -> Disposition {
        if !self.policy.is_trusted(&message.origin) {
            return Disposition::ignored(IgnoreReason::UntrustedOrigin);
        }

        let message_type = message.data.get("type").and_then(|t| t.as_str());
        if message_type != Some(self.message_type.as_str()) {
            return Disposition::ignored(IgnoreReason::OtherMessageType);
        }

        let payload = match message.data.get("payload") {
            Some(payload) => payload.clone(),
            None => return Disposition::ignored(IgnoreReason::Malformed),
        };
        let payload: OverridePayload = match serde_json::from_value(payload) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(error = %err, "undecodable style override payload");
                return Disposition::ignored(IgnoreReason::Malformed);
            }
        };

        match payload {
            OverridePayload::CssVars { variables } => self.apply_css_vars(&variables),
            OverridePayload::Theme { theme } => {
                self.theme.set_theme(theme);
                Disposition::ThemeForwarded { theme }
            }
            OverridePayload::Unknown => Disposition::ignored(IgnoreReason::UnknownKind),
        }
    }

    fn apply_css_vars(&self, variables: &BTreeMap<String, serde_json::Value>) -> Disposition {
        let mut applied = 0;
        let mut skipped = 0;
        let mut root = self.root.borrow_mut();
        for (name, value) in variables {
            if !is_custom_property(name) {
                tracing::debug!(%name, "skipped non-custom property");
                skipped += 1;
                continue;
            }
            match value.as_str() {
                Some(value) if is_single_value(value) => {
                    root.set_style_property(name, value);
                    applied += 1;
                }
                _ => {
                    tracing::debug!(%name, %value, "skipped unusable custom property value");
                    skipped += 1;
                }
            }
        }
        Disposition::CssVarsApplied { applied, skipped }
    }
}

/// `--` followed by at least one character that cannot end or split a
/// declaration.
fn is_custom_property(name: &str) -> bool {
    match name.strip_prefix("--") {
        Some(rest) => {
            !rest.is_empty()
                && !rest.chars().any(|c| {
                    c.is_whitespace() || matches!(c, ':' | ';' | '{' | '}' | '"' | '\'' | '\\')
                })
        }
        None => false,
    }
}

/// True if `value` stays inside one declaration: no `;`, `!`, `{` or `}`
/// outside quotes and parentheses, and every quote and parenthesis closed.
fn is_single_value(value: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            (None, '{' | '}') => return false,
            (None, ';' | '!') if depth == 0 => return false,
            _ => {}
        }
    }
    quote.is_none() && depth == 0 && !escaped
}

/// Applies style override messages from trusted origins.
pub struct StyleOverrideBridge {
    state: Rc<BridgeState>,
    subscription: Option<Subscription>,
}

impl StyleOverrideBridge {
    /// Mounts the bridge inside `scope` and starts listening on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::MissingProvider`] if `scope` has no theme provider.
    pub fn mount(
        scope: &Scope,
        root: RootHandle,
        channel: &MessageChannel,
        policy: OriginPolicy,
        message_type: &str,
    ) -> Result<Self, ThemeError> {
        let theme = scope.theme_for("StyleOverrideBridge")?;
        let state = Rc::new(BridgeState {
            theme,
            root,
            policy,
            message_type: message_type.to_string(),
            last: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        let subscription = channel.subscribe(move |message| {
            if let Some(state) = weak.upgrade() {
                state.handle(message);
            }
        });

        Ok(Self {
            state,
            subscription: Some(subscription),
        })
    }

    /// Processes one message directly, bypassing the channel.
    pub fn handle_message(&self, message: &InboundMessage) -> Disposition {
        self.state.handle(message)
    }

    /// Outcome of the most recent message.
    pub fn last_disposition(&self) -> Option<Disposition> {
        self.state.last.borrow().clone()
    }

    /// Stops listening on the channel. Applied overrides stay in place.
    pub fn unmount(mut self) {
        self.subscription.take();
    }
}

impl fmt::Debug for StyleOverrideBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleOverrideBridge")
            .field("policy", &self.state.policy)
            .field("message_type", &self.state.message_type)
            .field("listening", &self.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ThemeController;
    use serde_json::json;

    const ORIGIN: &str = "http://localhost";

    struct Fixture {
        controller: ThemeController,
        root: RootHandle,
        channel: MessageChannel,
        bridge: StyleOverrideBridge,
    }

    fn fixture() -> Fixture {
        let controller = ThemeController::new(ThemeMode::Light);
        let scope = Scope::root().provide(controller.handle());
        let root = RootHandle::new();
        let channel = MessageChannel::new();
        let bridge = StyleOverrideBridge::mount(
            &scope,
            root.clone(),
            &channel,
            OriginPolicy::same_origin(ORIGIN),
            DEFAULT_MESSAGE_TYPE,
        )
        .unwrap();
        Fixture {
            controller,
            root,
            channel,
            bridge,
        }
    }

    #[test]
    fn test_payload_decoding() {
        let payload: OverridePayload =
            serde_json::from_value(json!({"kind": "theme", "theme": "DARK"})).unwrap();
        assert_eq!(
            payload,
            OverridePayload::Theme {
                theme: ThemeMode::Dark
            }
        );

        let payload: OverridePayload =
            serde_json::from_value(json!({"kind": "fonts", "family": "serif"})).unwrap();
        assert_eq!(payload, OverridePayload::Unknown);
    }

    #[test]
    fn test_css_vars_message_sets_property() {
        let f = fixture();
        f.channel.post(
            OverrideMessage::css_vars([("--vibe-test-var", "#123456")]).from_origin(ORIGIN),
        );
        assert_eq!(f.root.borrow().style_property("--vibe-test-var"), Some("#123456"));
        assert_eq!(
            f.bridge.last_disposition(),
            Some(Disposition::CssVarsApplied {
                applied: 1,
                skipped: 0
            })
        );
    }

    #[test]
    fn test_css_vars_overwrite_and_persist() {
        let f = fixture();
        f.channel
            .post(OverrideMessage::css_vars([("--x", "#123456"), ("--y", "1px")]).from_origin(ORIGIN));
        f.channel
            .post(OverrideMessage::css_vars([("--x", "#abcdef")]).from_origin(ORIGIN));

        let root = f.root.borrow();
        assert_eq!(root.style_property("--x"), Some("#abcdef"));
        assert_eq!(root.style_property("--y"), Some("1px"));
    }

    #[test]
    fn test_non_custom_properties_are_skipped() {
        let f = fixture();
        let disposition = f.bridge.handle_message(
            &OverrideMessage::css_vars([("color", "red"), ("--", "x"), ("--ok", "1")])
                .from_origin(ORIGIN),
        );
        assert_eq!(
            disposition,
            Disposition::CssVarsApplied {
                applied: 1,
                skipped: 2
            }
        );
        assert_eq!(f.root.borrow().style_property("color"), None);
    }

    #[test]
    fn test_entries_cannot_smuggle_extra_declarations() {
        let f = fixture();
        let disposition = f.bridge.handle_message(&InboundMessage::new(
            ORIGIN,
            json!({
                "type": DEFAULT_MESSAGE_TYPE,
                "payload": {
                    "kind": "cssVars",
                    "variables": {
                        "--a: 1; background": "url(https://evil.example/x)",
                        "--b": "red; color: blue",
                        "--c": "blue !important",
                        "--d": "x } body { color: red",
                        "--ok": "url(\"a;b\")"
                    }
                }
            }),
        ));
        assert_eq!(
            disposition,
            Disposition::CssVarsApplied {
                applied: 1,
                skipped: 4
            }
        );

        let root = f.root.borrow();
        assert_eq!(root.style_properties().len(), 1);
        assert_eq!(root.style_property("--ok"), Some("url(\"a;b\")"));
        assert_eq!(root.css_text(), "--ok: url(\"a;b\");");
    }

    #[test]
    fn test_custom_property_names() {
        for ok in ["--x", "--vibe-test-var", "--_1", "--\u{e9}"] {
            assert!(is_custom_property(ok), "{ok:?}");
        }
        for bad in ["", "-", "--", "color", "-x", "--a b", "--a:b", "--a;", "--a{", "--\"a\""] {
            assert!(!is_custom_property(bad), "{bad:?}");
        }
    }

    #[test]
    fn test_single_value_check() {
        for ok in ["#123456", "1px solid red", "url(a;b)", "'a;b'", "calc(1px + (2px * 3))", ""] {
            assert!(is_single_value(ok), "{ok:?}");
        }
        for bad in ["red; color: blue", "red !important", "}", "a{", "url(x", "x)", "'open", "x\\"] {
            assert!(!is_single_value(bad), "{bad:?}");
        }
    }

    #[test]
    fn test_non_string_values_are_skipped_per_entry() {
        let f = fixture();
        let disposition = f.bridge.handle_message(&InboundMessage::new(
            ORIGIN,
            json!({
                "type": DEFAULT_MESSAGE_TYPE,
                "payload": {
                    "kind": "cssVars",
                    "variables": { "--a": "1", "--n": 4, "--nil": null }
                }
            }),
        ));
        assert_eq!(
            disposition,
            Disposition::CssVarsApplied {
                applied: 1,
                skipped: 2
            }
        );
        assert_eq!(f.root.borrow().style_property("--a"), Some("1"));
        assert_eq!(f.root.borrow().style_property("--n"), None);
    }

    #[test]
    fn test_theme_message_forwards_to_controller() {
        let f = fixture();
        f.channel
            .post(OverrideMessage::theme(ThemeMode::Dark).from_origin(ORIGIN));
        assert_eq!(f.controller.theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_untrusted_origin_is_dropped() {
        let f = fixture();
        let disposition = f
            .bridge
            .handle_message(&OverrideMessage::theme(ThemeMode::Dark).from_origin("https://evil.example"));
        assert_eq!(
            disposition,
            Disposition::Ignored {
                reason: IgnoreReason::UntrustedOrigin
            }
        );
        assert_eq!(f.controller.theme(), ThemeMode::Light);
    }

    #[test]
    fn test_other_message_types_are_ignored() {
        let f = fixture();
        let message = InboundMessage::new(
            ORIGIN,
            json!({"type": "RESIZE", "payload": {"kind": "theme", "theme": "DARK"}}),
        );
        assert_eq!(
            f.bridge.handle_message(&message),
            Disposition::Ignored {
                reason: IgnoreReason::OtherMessageType
            }
        );
        assert_eq!(f.controller.theme(), ThemeMode::Light);

        let message = InboundMessage::new(ORIGIN, json!("hello"));
        assert!(f.bridge.handle_message(&message).is_ignored());
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let f = fixture();
        let message = InboundMessage::new(
            ORIGIN,
            json!({"type": DEFAULT_MESSAGE_TYPE, "payload": {"kind": "fonts"}}),
        );
        assert_eq!(
            f.bridge.handle_message(&message),
            Disposition::Ignored {
                reason: IgnoreReason::UnknownKind
            }
        );
    }

    #[test]
    fn test_malformed_payloads_are_ignored() {
        let f = fixture();
        let cases = [
            json!({"type": DEFAULT_MESSAGE_TYPE}),
            json!({"type": DEFAULT_MESSAGE_TYPE, "payload": {"kind": "theme", "theme": "SEPIA"}}),
            json!({"type": DEFAULT_MESSAGE_TYPE, "payload": {"kind": "cssVars", "variables": ["--x"]}}),
            json!({"type": DEFAULT_MESSAGE_TYPE, "payload": {"theme": "DARK"}}),
        ];
        for data in cases {
            let disposition = f.bridge.handle_message(&InboundMessage::new(ORIGIN, data.clone()));
            assert_eq!(
                disposition,
                Disposition::Ignored {
                    reason: IgnoreReason::Malformed
                },
                "{data}"
            );
        }
        assert_eq!(f.controller.theme(), ThemeMode::Light);
    }

    #[test]
    fn test_mount_without_provider_fails() {
        let result = StyleOverrideBridge::mount(
            &Scope::root(),
            RootHandle::new(),
            &MessageChannel::new(),
            OriginPolicy::new(),
            DEFAULT_MESSAGE_TYPE,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("StyleOverrideBridge"));
    }

    #[test]
    fn test_unmount_stops_listening() {
        let f = fixture();
        f.bridge.unmount();
        assert_eq!(f.channel.subscriber_count(), 0);

        f.channel
            .post(OverrideMessage::theme(ThemeMode::Dark).from_origin(ORIGIN));
        assert_eq!(f.controller.theme(), ThemeMode::Light);
    }

    #[test]
    fn test_origin_normalization() {
        let policy = OriginPolicy::same_origin("http://localhost/").trust("https://Host.Example:8443");
        assert!(policy.is_trusted("http://localhost"));
        assert!(policy.is_trusted("HTTP://LOCALHOST/"));
        assert!(policy.is_trusted("https://host.example:8443"));
        assert!(!policy.is_trusted("https://host.example"));
        assert!(!policy.is_trusted("null"));
    }

    #[test]
    fn test_empty_policy_trusts_nobody() {
        assert!(!OriginPolicy::new().is_trusted(ORIGIN));
        assert!(OriginPolicy::new().allow_any().is_trusted("null"));
    }

    #[test]
    fn test_policy_from_entries() {
        let policy =
            OriginPolicy::from_entries(Some("http://localhost:3000"), &["https://editor.example"])
                .unwrap();
        assert!(policy.is_trusted("http://localhost:3000"));
        assert!(policy.is_trusted("https://editor.example"));

        let policy = OriginPolicy::from_entries(None, &["*"]).unwrap();
        assert!(policy.is_trusted("https://anything.example"));

        for bad in ["", "localhost", "https://", "https://host/path"] {
            assert!(
                OriginPolicy::from_entries(None, &[bad]).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }
}
