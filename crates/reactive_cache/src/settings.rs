//! Persisted connection settings and the namespace switches they emit.

use cache_host::{normalize_namespace, PrefsStore};
use serde::{Deserialize, Serialize};

use crate::signal::NamespaceSignal;

/// Preference key holding the serialized [`Settings`] record.
pub const SETTINGS_PREFS_KEY: &str = "settings";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Flat connection settings record. `namespace` selects the active cache namespace.
pub struct Settings {
    /// Backend host address.
    pub host: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Active cache namespace. Blank means `default`.
    pub namespace: String,
    /// Selected database.
    pub database: String,
}

/// Loads and saves [`Settings`] through a [`PrefsStore`], announcing namespace changes.
pub struct SettingsStore<P> {
    prefs: P,
    signal: NamespaceSignal,
}

impl<P: PrefsStore> SettingsStore<P> {
    /// Creates a settings store that emits namespace changes on `signal`.
    pub fn new(prefs: P, signal: NamespaceSignal) -> Self {
        Self { prefs, signal }
    }

    /// Signal that receives namespace changes.
    pub fn signal(&self) -> &NamespaceSignal {
        &self.signal
    }

    /// Loads the persisted settings, or defaults when none are stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the prefs store or JSON decoding fails.
    pub async fn load(&self) -> Result<Settings, String> {
        match self.prefs.load_pref(SETTINGS_PREFS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|err| format!("failed to decode `{SETTINGS_PREFS_KEY}` record: {err}")),
            None => Ok(Settings::default()),
        }
    }

    /// Persists `settings`, emitting a namespace switch if the namespace changed.
    ///
    /// # Errors
    ///
    /// Returns an error when loading the previous record or saving fails. Nothing is emitted
    /// on failure.
    pub async fn save(&self, settings: &Settings) -> Result<(), String> {
        let previous = self.load().await?;
        let raw = serde_json::to_string(settings)
            .map_err(|err| format!("failed to encode `{SETTINGS_PREFS_KEY}` record: {err}"))?;
        self.prefs.save_pref(SETTINGS_PREFS_KEY, &raw).await?;
        let namespace = normalize_namespace(&settings.namespace);
        if normalize_namespace(&previous.namespace) != namespace {
            self.signal.emit(&namespace);
        }
        Ok(())
    }

    /// Updates only the namespace field.
    ///
    /// # Errors
    ///
    /// Same as [`SettingsStore::save`].
    pub async fn set_namespace(&self, namespace: &str) -> Result<(), String> {
        let mut settings = self.load().await?;
        settings.namespace = namespace.to_string();
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use cache_host::MemoryPrefsStore;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn load_returns_defaults_when_missing() {
        let store = SettingsStore::new(MemoryPrefsStore::default(), NamespaceSignal::new());
        assert_eq!(block_on(store.load()).expect("load"), Settings::default());
    }

    #[test]
    fn settings_round_trip_with_partial_records() {
        let prefs = MemoryPrefsStore::default();
        block_on(prefs.save_pref(SETTINGS_PREFS_KEY, "{\"host\":\"db.local\"}"))
            .expect("seed partial record");
        let store = SettingsStore::new(prefs, NamespaceSignal::new());
        let loaded = block_on(store.load()).expect("load");
        assert_eq!(
            loaded,
            Settings {
                host: "db.local".to_string(),
                ..Settings::default()
            }
        );
    }

    #[test]
    fn set_namespace_persists_and_emits_once_per_change() {
        let signal = NamespaceSignal::new();
        let mut sub = signal.subscribe();
        let store = SettingsStore::new(MemoryPrefsStore::default(), signal);

        block_on(store.set_namespace("work")).expect("switch to work");
        assert_eq!(sub.latest(), Some("work".to_string()));

        block_on(store.set_namespace("work")).expect("same namespace");
        assert_eq!(sub.latest(), None);

        assert_eq!(block_on(store.load()).expect("load").namespace, "work");
    }

    #[test]
    fn malformed_record_is_reported_and_not_overwritten() {
        let prefs = MemoryPrefsStore::default();
        block_on(prefs.save_pref(SETTINGS_PREFS_KEY, "{\"host\":")).expect("seed bad record");
        let signal = NamespaceSignal::new();
        let mut sub = signal.subscribe();
        let store = SettingsStore::new(prefs.clone(), signal);

        let err = block_on(store.load()).expect_err("malformed record");
        assert!(err.starts_with("failed to decode `settings` record:"), "{err}");
        assert!(block_on(store.set_namespace("work")).is_err());
        assert_eq!(sub.latest(), None);
        assert_eq!(
            block_on(prefs.load_pref(SETTINGS_PREFS_KEY)).expect("raw"),
            Some("{\"host\":".to_string())
        );
    }

    #[test]
    fn saving_other_fields_does_not_emit() {
        let signal = NamespaceSignal::new();
        let mut sub = signal.subscribe();
        let store = SettingsStore::new(MemoryPrefsStore::default(), signal);

        let settings = Settings {
            username: "root".to_string(),
            ..Settings::default()
        };
        block_on(store.save(&settings)).expect("save");
        assert_eq!(sub.latest(), None);
    }

    #[test]
    fn blank_namespace_is_treated_as_default() {
        let signal = NamespaceSignal::new();
        let mut sub = signal.subscribe();
        let store = SettingsStore::new(MemoryPrefsStore::default(), signal);

        block_on(store.set_namespace("default")).expect("explicit default");
        assert_eq!(sub.latest(), None);
    }
}
