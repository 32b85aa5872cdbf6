//! Built-in masking rules.
//!
//! Each rule pairs a regex with a replacer that produces the partially
//! revealed form of a match. Rules are applied in the order returned by
//! [`builtin_rules`]; later rules see the output of earlier ones.

use std::fmt;

use regex::{Captures, Regex};

/// Mask substituted for a username inside a path.
pub const USERNAME_MASK: &str = "•••••";

/// Mask inserted between the kept prefix of an email's local part and the `@`.
pub const EMAIL_MASK: &str = "•••";

/// Constant middle of a masked UUID, independent of the group lengths.
pub const UUID_MASK: &str = "••••-••••-••••-••••-";

/// Middle of a masked long hex token.
pub const HEX_MASK: &str = "••••••••••••••••••••";

/// Replacement for a hex token too short to partially reveal.
pub const SHORT_HEX_MASK: &str = "••••••••••••••••";

/// Number of characters kept on each side of a UUID or hex token.
const REVEAL_CHARS: usize = 4;

/// Tokens longer than this keep their first and last characters.
const HEX_REVEAL_THRESHOLD: usize = 20;

/// Produces the replacement text for one match.
pub type Replacer = fn(&Captures<'_>) -> String;

/// A compiled masking rule.
pub struct PatternRule {
    /// Name of the rule for identification.
    pub name: &'static str,

    /// Description of what this rule matches.
    pub description: &'static str,

    regex: Regex,
    replacer: Replacer,
}

impl PatternRule {
    /// Create a new masking rule.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(
        name: &'static str,
        description: &'static str,
        pattern: &str,
        replacer: Replacer,
    ) -> Self {
        Self {
            name,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            replacer,
        }
    }

    /// Check if the content matches this rule.
    #[must_use]
    pub fn matches(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }

    /// Count the matches in the content.
    #[must_use]
    pub fn count(&self, content: &str) -> usize {
        self.regex.find_iter(content).count()
    }

    /// Replace every match in the content with its masked form.
    #[must_use]
    pub fn apply(&self, content: &str) -> String {
        self.regex
            .replace_all(content, |caps: &Captures<'_>| (self.replacer)(caps))
            .into_owned()
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// Get the built-in content rules in application order.
///
/// UUID and hex token boundaries are ASCII word boundaries, so a token
/// directly after a non-ASCII letter is still masked.
///
/// Username masking is not part of this list: it depends on the username
/// known for a call and always runs before these rules.
#[must_use]
pub fn builtin_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "email",
            "Email addresses (local part partially revealed)",
            r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+",
            |caps| mask_email(&caps[0]),
        ),
        PatternRule::new(
            "uuid",
            "Hyphenated 8-4-4-4-12 UUIDs",
            r"(?i)(?-u:\b)[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}(?-u:\b)",
            |caps| mask_uuid(&caps[0]),
        ),
        PatternRule::new(
            "hex_token",
            "Bare runs of 32 or more hex characters (hashes, keys)",
            r"(?i)(?-u:\b)[a-f0-9]{32,}(?-u:\b)",
            |caps| mask_hex_token(&caps[0]),
        ),
    ]
}

/// Mask an email address, keeping the domain and up to two local characters.
#[must_use]
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    if local.chars().count() <= 2 {
        return format!("{EMAIL_MASK}@{domain}");
    }

    let kept: String = local.chars().take(2).collect();
    format!("{kept}{EMAIL_MASK}@{domain}")
}

/// Mask a UUID, keeping its first and last four characters.
#[must_use]
pub fn mask_uuid(uuid: &str) -> String {
    format!("{}{UUID_MASK}{}", head(uuid), tail(uuid))
}

/// Mask a long hex token.
///
/// The short form is unreachable through the `hex_token` rule, whose
/// quantifier never yields fewer than 32 characters.
#[must_use]
pub fn mask_hex_token(token: &str) -> String {
    if token.chars().count() > HEX_REVEAL_THRESHOLD {
        format!("{}{HEX_MASK}{}", head(token), tail(token))
    } else {
        SHORT_HEX_MASK.to_string()
    }
}

fn head(value: &str) -> &str {
    let end = value
        .char_indices()
        .nth(REVEAL_CHARS)
        .map_or(value.len(), |(i, _)| i);
    &value[..end]
}

fn tail(value: &str) -> &str {
    let start = value
        .char_indices()
        .rev()
        .nth(REVEAL_CHARS - 1)
        .map_or(0, |(i, _)| i);
    &value[start..]
}
