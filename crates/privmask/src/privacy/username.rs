//! Username detection and masking inside OS user directory paths.
//!
//! Each [`PathStyle`] knows how to find a username in its own path
//! convention and how to build the pattern that masks a known username.
//! Styles are tried in [`PathStyle::ALL`] order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::patterns::USERNAME_MASK;

/// Characters that can never be part of a username segment.
const NAME_CHARS: &str = r#"[^\\/<>:"|?*\r\n]"#;

static WINDOWS_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"[Cc]:[\\/][Uu]sers[\\/]({NAME_CHARS}+)")).expect("Invalid regex pattern")
});

static MACOS_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"/Users/({NAME_CHARS}+)")).expect("Invalid regex pattern")
});

static LINUX_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"/home/({NAME_CHARS}+)")).expect("Invalid regex pattern")
});

static TILDE_USER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"~({NAME_CHARS}*)")).expect("Invalid regex pattern"));

/// A path convention that can carry a username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// `C:\Users\<name>` or `C:/Users/<name>`.
    Windows,
    /// `/Users/<name>`.
    MacOs,
    /// `/home/<name>`.
    Linux,
    /// `~<name>` shell shorthand.
    Tilde,
}

impl PathStyle {
    /// All styles in resolution order.
    pub const ALL: [Self; 4] = [Self::Windows, Self::MacOs, Self::Linux, Self::Tilde];

    /// Find the username in the first path of this style within `text`.
    ///
    /// Only the first occurrence of the style is considered.
    #[must_use]
    pub fn resolve<'t>(self, text: &'t str) -> Option<&'t str> {
        let caps = self.resolver().captures(text)?;
        let name = caps.get(1)?.as_str();
        (!name.is_empty()).then_some(name)
    }

    /// Pattern matching `<prefix><username>` for this style.
    ///
    /// The prefix is captured as group 1. The username is escaped and
    /// matched case-insensitively.
    #[must_use]
    pub fn mask_pattern(self, username: &str) -> String {
        let escaped = regex::escape(username);
        let prefix = match self {
            Self::Windows => r"[Cc]:[\\/][Uu]sers[\\/]",
            Self::MacOs => r"/(?:Users)/",
            Self::Linux => r"/(?:home)/",
            Self::Tilde => r"~/?",
        };
        format!("(?i)({prefix}){escaped}")
    }

    /// Characters accepted right after the username.
    #[must_use]
    pub fn separators(self) -> &'static [char] {
        match self {
            Self::Windows => &['\\', '/'],
            Self::MacOs | Self::Linux | Self::Tilde => &['/'],
        }
    }

    fn resolver(self) -> &'static Regex {
        match self {
            Self::Windows => &WINDOWS_USER,
            Self::MacOs => &MACOS_USER,
            Self::Linux => &LINUX_USER,
            Self::Tilde => &TILDE_USER,
        }
    }
}

impl std::fmt::Display for PathStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Tilde => write!(f, "tilde"),
        }
    }
}

/// Infer a username from the paths in `text`.
///
/// Returns the name and the style it was found in. The first style in
/// [`PathStyle::ALL`] order that finds a name wins.
#[must_use]
pub fn resolve_username(text: &str) -> Option<(&str, PathStyle)> {
    PathStyle::ALL
        .into_iter()
        .find_map(|style| style.resolve(text).map(|name| (name, style)))
}

/// Mask every occurrence of `username` in any of the path styles.
///
/// Returns the masked text and the number of replacements made.
#[must_use]
pub fn mask_username(text: &str, username: &str) -> (String, usize) {
    let mut result = text.to_string();
    let mut total = 0;

    for style in PathStyle::ALL {
        let regex = match Regex::new(&style.mask_pattern(username)) {
            Ok(r) => r,
            Err(e) => {
                warn!(style = %style, error = %e, "Skipping username pattern");
                continue;
            }
        };

        let (masked, count) = replace_before_separator(&regex, &result, style.separators());
        if count > 0 {
            trace!(style = %style, count, "Username masked");
            result = masked;
            total += count;
        }
    }

    (result, total)
}

/// Replace matches of `regex` that are immediately followed by one of
/// `separators`, keeping capture group 1 and masking the rest.
///
/// The separator is not consumed. A match that is not followed by a
/// separator is retried one character later, so overlapping candidates
/// are still found.
fn replace_before_separator(regex: &Regex, text: &str, separators: &[char]) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut count = 0;

    while pos <= text.len() {
        let Some(caps) = regex.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        if text[whole.end()..].starts_with(separators) {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            out.push_str(&text[copied..whole.start()]);
            out.push_str(prefix);
            out.push_str(USERNAME_MASK);
            copied = whole.end();
            pos = whole.end();
            count += 1;
        } else {
            pos = whole.start()
                + text[whole.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
    }

    out.push_str(&text[copied..]);
    (out, count)
}
