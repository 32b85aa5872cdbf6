//! Sensitive-text redaction.
//!
//! This module masks personally identifying substrings in free text while
//! keeping the surrounding text intact:
//!
//! - **User directories**: the username in `C:\Users\<name>`, `/Users/<name>`,
//!   `/home/<name>` and `~<name>` paths becomes `•••••`. The username is
//!   supplied by the caller or inferred from the first path in the text.
//!
//! - **Emails**: the local part is reduced to at most two characters.
//!
//! - **UUIDs and long hex tokens**: only the first and last four characters
//!   survive.
//!
//! Masking is a pure function of its inputs. The on/off switch is passed in
//! by value; see [`crate::toggle`] for the persisted switch.
//!
//! # Example
//!
//! ```
//! use privmask::privacy::mask;
//!
//! let masked = mask("/Users/alice/notes.txt from alice@example.com", None, true);
//! assert_eq!(masked, "/Users/•••••/notes.txt from al•••@example.com");
//!
//! // Disabled masking returns the input untouched
//! assert_eq!(mask("/Users/alice/x", None, false), "/Users/alice/x");
//! ```

mod patterns;
mod redactor;
mod session;
mod username;

pub use patterns::{
    builtin_rules, mask_email, mask_hex_token, mask_uuid, PatternRule, Replacer, EMAIL_MASK,
    HEX_MASK, SHORT_HEX_MASK, USERNAME_MASK, UUID_MASK,
};
pub use redactor::{mask, redact, unmask, Redaction, Redactor, UsernameSource, USER_PATH_RULE};
pub use session::username_from_location;
pub use username::{mask_username, resolve_username, PathStyle};
