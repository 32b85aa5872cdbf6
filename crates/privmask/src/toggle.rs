//! The process-wide privacy switch.
//!
//! [`PrivacyToggle`] owns the enable flag, persists it through a
//! [`PreferenceBackend`] and tells subscribers when it flips. The redaction
//! core never sees this type; it only receives the flag value.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::Result;
use crate::privacy;

/// Preference key under which the enable flag is stored.
pub const PRIVACY_ENABLED_KEY: &str = "privacy_enabled";

/// Somewhere boolean preferences can be loaded from and saved to.
pub trait PreferenceBackend {
    /// Load a flag, returning `None` when nothing is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or the stored value is
    /// not a boolean.
    fn load_flag(&self, key: &str) -> Result<Option<bool>>;

    /// Store a flag under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn store_flag(&mut self, key: &str, value: bool) -> Result<()>;
}

/// In-process preference backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    flags: HashMap<String, bool>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with `key` already set to `value`.
    #[must_use]
    pub fn with_flag(key: impl Into<String>, value: bool) -> Self {
        let mut flags = HashMap::new();
        flags.insert(key.into(), value);
        Self { flags }
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load_flag(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.flags.get(key).copied())
    }

    fn store_flag(&mut self, key: &str, value: bool) -> Result<()> {
        self.flags.insert(key.to_string(), value);
        Ok(())
    }
}

/// Handle returned by [`PrivacyToggle::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(bool) + Send + Sync>;

/// Owner of the enable flag.
///
/// Reads go through [`is_enabled`](Self::is_enabled). Writes persist to the
/// backend first and only then update the in-memory flag and notify
/// subscribers, so a failed save leaves the flag untouched.
///
/// A poisoned lock is recovered, never reported: the flag only changes after
/// a completed save, so a panicking writer cannot leave it half-updated.
pub struct PrivacyToggle<B> {
    backend: Mutex<B>,
    enabled: AtomicBool,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
}

impl<B: PreferenceBackend> PrivacyToggle<B> {
    /// Load the flag from `backend`, falling back to `default` when it has
    /// never been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn load(backend: B, default: bool) -> Result<Self> {
        let stored = backend.load_flag(PRIVACY_ENABLED_KEY)?;
        let enabled = stored.unwrap_or(default);
        debug!(enabled, stored = stored.is_some(), "Loaded privacy flag");

        Ok(Self {
            backend: Mutex::new(backend),
            enabled: AtomicBool::new(enabled),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    /// Whether masking is currently on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Set the flag.
    ///
    /// Returns `true` if the value changed. An unchanged value is neither
    /// saved nor announced.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn set(&self, enabled: bool) -> Result<bool> {
        {
            let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);

            if self.enabled.load(Ordering::SeqCst) == enabled {
                return Ok(false);
            }

            backend.store_flag(PRIVACY_ENABLED_KEY, enabled)?;
            self.enabled.store(enabled, Ordering::SeqCst);
        }

        info!(enabled, "Privacy mode changed");
        self.notify(enabled);
        Ok(true)
    }

    /// Flip the flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn toggle(&self) -> Result<bool> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);

        let enabled = !self.enabled.load(Ordering::SeqCst);
        backend.store_flag(PRIVACY_ENABLED_KEY, enabled)?;
        self.enabled.store(enabled, Ordering::SeqCst);
        drop(backend);

        info!(enabled, "Privacy mode toggled");
        self.notify(enabled);
        Ok(enabled)
    }

    /// Register a callback run with the new value after every change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Mask `text` according to the current flag.
    #[must_use]
    pub fn mask(&self, text: &str, username: Option<&str>) -> String {
        privacy::mask(text, username, self.is_enabled())
    }

    /// Consume the toggle and return its backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, enabled: bool) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(enabled);
        }
    }
}

impl<B> fmt::Debug for PrivacyToggle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("PrivacyToggle")
            .field("enabled", &self.enabled.load(Ordering::SeqCst))
            .field("subscribers", &subscribers)
            .finish_non_exhaustive()
    }
}
