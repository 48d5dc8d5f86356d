//! Color mode preference and its change notifications.
//!
//! Reads the saved preference from durable storage, resolves `system`
//! against the platform hint, and publishes the resolved mode on a `watch`
//! channel so chart styling can follow it. Toggle writes the new preference
//! back to storage.

#[cfg(test)]
#[path = "color_mode_test.rs"]
mod color_mode_test;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::storage::KeyValueStore;

pub const STORAGE_KEY: &str = "color_mode";

/// Concrete mode applied to rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

/// What the user asked for. `System` defers to the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorPreference {
    System,
    Light,
    #[default]
    Dark,
}

impl ColorPreference {
    /// Resolve against the platform hint; no hint means light.
    #[must_use]
    pub fn resolve(self, system_prefers_dark: Option<bool>) -> ColorMode {
        match self {
            Self::Light => ColorMode::Light,
            Self::Dark => ColorMode::Dark,
            Self::System => {
                if system_prefers_dark.unwrap_or(false) {
                    ColorMode::Dark
                } else {
                    ColorMode::Light
                }
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color preference '{0}' (expected 'system', 'light' or 'dark')")]
pub struct ParsePreferenceError(String);

impl FromStr for ColorPreference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ParsePreferenceError(other.to_owned())),
        }
    }
}

/// Process-wide color preference with change notifications.
pub struct ColorModeStore {
    storage: Arc<dyn KeyValueStore>,
    system_prefers_dark: Option<bool>,
    preference: watch::Sender<ColorPreference>,
    mode: watch::Sender<ColorMode>,
}

impl ColorModeStore {
    /// Load the saved preference from `storage`, defaulting to dark.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>, system_prefers_dark: Option<bool>) -> Self {
        let preference = storage
            .get(STORAGE_KEY)
            .and_then(|raw| match raw.parse::<ColorPreference>() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring saved color preference");
                    None
                }
            })
            .unwrap_or_default();
        let mode = preference.resolve(system_prefers_dark);
        Self {
            storage,
            system_prefers_dark,
            preference: watch::Sender::new(preference),
            mode: watch::Sender::new(mode),
        }
    }

    #[must_use]
    pub fn preference(&self) -> ColorPreference {
        *self.preference.borrow()
    }

    #[must_use]
    pub fn mode(&self) -> ColorMode {
        *self.mode.borrow()
    }

    /// Receiver that observes every change of the resolved mode.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ColorMode> {
        self.mode.subscribe()
    }

    /// Store and publish a new preference.
    pub fn set_preference(&self, preference: ColorPreference) {
        self.storage.set(STORAGE_KEY, preference.as_str());
        self.preference.send_replace(preference);
        let mode = preference.resolve(self.system_prefers_dark);
        self.mode.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                *current = mode;
                true
            }
        });
    }

    /// Flip between light and dark, pinning an explicit preference.
    pub fn toggle(&self) -> ColorMode {
        let next = if self.mode().is_dark() { ColorPreference::Light } else { ColorPreference::Dark };
        self.set_preference(next);
        self.mode()
    }
}
