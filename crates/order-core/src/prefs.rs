//! # Preferences
//!
//! Durable key-value preferences that survive between sessions.
//!
//! ## Keys
//! ```text
//! ┌──────────────────────────┬─────────────────┬──────────────────────────┐
//! │ Key                      │ Values          │ Absent / unparseable     │
//! ├──────────────────────────┼─────────────────┼──────────────────────────┤
//! │ preferredLanguage        │ en | es         │ en                       │
//! │ userTheme                │ light | dark    │ system theme             │
//! │ cookieConsentAccepted    │ true            │ banner shown             │
//! │ deliverySelection        │ yes | no        │ unset                    │
//! └──────────────────────────┴─────────────────┴──────────────────────────┘
//! ```
//!
//! The engine writes through the [`PreferenceStore`] trait, so the backing
//! store can be in-memory (tests, `summary`) or SQLite (order-store).
//! Writes are fire-and-forget: a store that cannot persist keeps going.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::{DeliveryChoice, Language, Theme, ViewState};

// =============================================================================
// Keys
// =============================================================================

/// Fixed preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Language,
    Theme,
    CookieConsent,
    Delivery,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 4] = [
        PreferenceKey::Language,
        PreferenceKey::Theme,
        PreferenceKey::CookieConsent,
        PreferenceKey::Delivery,
    ];

    /// The storage key string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::Language => "preferredLanguage",
            PreferenceKey::Theme => "userTheme",
            PreferenceKey::CookieConsent => "cookieConsentAccepted",
            PreferenceKey::Delivery => "deliverySelection",
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Durable string key-value storage for preferences.
///
/// Implementations must not block the caller for long and must not fail
/// loudly: the engine treats persistence as best effort.
pub trait PreferenceStore: Send {
    fn get(&self, key: PreferenceKey) -> Option<String>;
    fn set(&mut self, key: PreferenceKey, value: &str);
    fn remove(&mut self, key: PreferenceKey);
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a store, e.g. with values from a previous session.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        MemoryPreferences {
            values: Arc::new(Mutex::new(map)),
        }
    }

    /// Copy of every stored pair.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: PreferenceKey) -> Option<String> {
        self.lock().get(key.as_str()).cloned()
    }

    fn set(&mut self, key: PreferenceKey, value: &str) {
        self.lock().insert(key.as_str().to_string(), value.to_string());
    }

    fn remove(&mut self, key: PreferenceKey) {
        self.lock().remove(key.as_str());
    }
}

// =============================================================================
// Typed View
// =============================================================================

/// Parsed preferences. `None` means "absent or unparseable".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub language: Option<Language>,
    pub theme: Option<Theme>,
    pub cookie_consent_accepted: bool,
    pub delivery: Option<DeliveryChoice>,
}

impl Preferences {
    /// Reads and parses every known key.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Preferences {
            language: store
                .get(PreferenceKey::Language)
                .and_then(|v| v.parse().ok()),
            theme: store
                .get(PreferenceKey::Theme)
                .and_then(|v| v.parse().ok()),
            cookie_consent_accepted: store
                .get(PreferenceKey::CookieConsent)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            delivery: store
                .get(PreferenceKey::Delivery)
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Startup view state: restored values, else defaults.
    pub fn into_view_state(self, system_theme: Theme) -> ViewState {
        ViewState {
            language: self.language.unwrap_or_default(),
            theme: self.theme.unwrap_or(system_theme),
            delivery: self.delivery,
            cookie_consent_accepted: self.cookie_consent_accepted,
            ..ViewState::new(system_theme)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
