//! The redactor: ordered application of username and content masking.

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, trace};

use super::patterns::{builtin_rules, PatternRule};
use super::username::{mask_username, resolve_username, PathStyle};

/// Rule name reported when usernames were masked in paths.
pub const USER_PATH_RULE: &str = "user_path";

static DEFAULT_REDACTOR: Lazy<Redactor> = Lazy::new(Redactor::new);

/// Where the username used for a redaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "style")]
pub enum UsernameSource {
    /// No username was supplied or found.
    #[default]
    None,
    /// The caller supplied the username.
    Supplied,
    /// The username was inferred from a path in the text.
    Inferred(PathStyle),
}

/// Outcome of a redaction.
///
/// Never carries the username itself, so it is safe to log or print.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Redaction {
    /// The masked text.
    pub content: String,

    /// Names of the rules that replaced something, in application order.
    pub rules_applied: Vec<&'static str>,

    /// Where the username came from.
    pub username_source: UsernameSource,
}

impl Redaction {
    fn unchanged(text: &str) -> Self {
        Self {
            content: text.to_string(),
            ..Self::default()
        }
    }

    /// Check if anything was masked.
    #[must_use]
    pub fn was_modified(&self) -> bool {
        !self.rules_applied.is_empty()
    }
}

/// Masks user directory names, emails, UUIDs and long hex tokens.
///
/// A `Redactor` holds only immutable compiled rules and can be shared
/// freely between threads.
#[derive(Debug)]
pub struct Redactor {
    rules: Vec<PatternRule>,
}

impl Redactor {
    /// Create a redactor with the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Get the content rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Mask sensitive substrings in `text`.
    ///
    /// Returns `text` unchanged when `enabled` is false or `text` is empty.
    /// An empty `known_username` counts as not supplied.
    #[must_use]
    pub fn mask(&self, text: &str, known_username: Option<&str>, enabled: bool) -> String {
        self.redact(text, known_username, enabled).content
    }

    /// Mask sensitive substrings in `text` and report what was applied.
    #[must_use]
    pub fn redact(&self, text: &str, known_username: Option<&str>, enabled: bool) -> Redaction {
        if !enabled || text.is_empty() {
            return Redaction::unchanged(text);
        }

        let (username, username_source) = match known_username.filter(|u| !u.is_empty()) {
            Some(name) => (Some(name), UsernameSource::Supplied),
            None => match resolve_username(text) {
                Some((name, style)) => (Some(name), UsernameSource::Inferred(style)),
                None => (None, UsernameSource::None),
            },
        };

        let mut content = text.to_string();
        let mut rules_applied = Vec::new();

        if let Some(name) = username {
            let (masked, count) = mask_username(&content, name);
            if count > 0 {
                content = masked;
                rules_applied.push(USER_PATH_RULE);
            }
        }

        for rule in &self.rules {
            if rule.matches(&content) {
                content = rule.apply(&content);
                rules_applied.push(rule.name);
                trace!(rule = %rule.name, "Content masked by rule");
            }
        }

        debug!(
            rules = ?rules_applied,
            username_source = ?username_source,
            "Redaction complete"
        );

        Redaction {
            content,
            rules_applied,
            username_source,
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mask `text` with the shared built-in redactor.
///
/// See [`Redactor::mask`].
#[must_use]
pub fn mask(text: &str, known_username: Option<&str>, enabled: bool) -> String {
    DEFAULT_REDACTOR.mask(text, known_username, enabled)
}

/// Mask `text` with the shared built-in redactor and report what was applied.
#[must_use]
pub fn redact(text: &str, known_username: Option<&str>, enabled: bool) -> Redaction {
    DEFAULT_REDACTOR.redact(text, known_username, enabled)
}

/// Return the original text for a masked value.
///
/// Masking is not reversible; this hands back `original_text` as-is and
/// never inspects `masked_text`. Callers keep the original themselves.
#[must_use]
pub fn unmask<'a>(_masked_text: &str, original_text: &'a str) -> &'a str {
    original_text
}
