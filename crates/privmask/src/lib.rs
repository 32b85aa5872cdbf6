//! `privmask` - Mask personally identifying fragments in free text
//!
//! This library hides user directory names, email addresses, UUIDs and long
//! hexadecimal tokens in arbitrary text, and keeps a persisted on/off switch
//! for callers that want one.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod privacy;
pub mod storage;
pub mod toggle;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use privacy::{mask, redact, unmask, Redaction, Redactor};
pub use storage::PreferenceStore;
pub use toggle::{MemoryBackend, PreferenceBackend, PrivacyToggle};
