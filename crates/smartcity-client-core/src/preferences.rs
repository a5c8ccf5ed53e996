use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::host::StorageBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

/// JSON key/value cache over a [`StorageBackend`]. Every operation is
/// fail-soft: errors are logged and never reach the caller.
pub struct PreferenceStore {
    backend: Rc<dyn StorageBackend>,
    namespace_key: String,
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn StorageBackend>, namespace_key: impl Into<String>) -> Self {
        Self {
            backend,
            namespace_key: namespace_key.into(),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "failed to serialize preference");
                return;
            }
        };
        if let Err(error) = self.backend.set_item(key, &serialized) {
            tracing::warn!(key = %key, error = %error, "failed to persist preference");
        }
    }

    /// Returns `default` when the key is absent, unreadable, or holds data
    /// that does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "failed to read preference");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "stored preference is not valid JSON");
                default
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(error) = self.backend.remove_item(key) {
            tracing::warn!(key = %key, error = %error, "failed to remove preference");
        }
    }

    #[must_use]
    pub fn load_preferences(&self) -> Preferences {
        self.get(&self.namespace_key, Preferences::default())
    }

    pub fn save_preferences(&self, preferences: &Preferences) {
        self.set(&self.namespace_key, preferences);
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut preferences = self.load_preferences();
        preferences.theme = preferences.theme.toggled();
        self.save_preferences(&preferences);
        preferences.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PREFERENCES_STORAGE_KEY;
    use crate::error::StorageError;
    use crate::host::MemoryStorage;
    use serde_json::{Value, json};

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn store_with(storage: &Rc<MemoryStorage>) -> PreferenceStore {
        PreferenceStore::new(
            Rc::clone(storage) as Rc<dyn StorageBackend>,
            PREFERENCES_STORAGE_KEY,
        )
    }

    #[test]
    fn get_returns_default_for_unwritten_key() {
        let store = store_with(&Rc::new(MemoryStorage::new()));
        assert_eq!(store.get("missing", Value::Null), Value::Null);
        assert_eq!(store.get("missing", 42_u32), 42);
    }

    #[test]
    fn get_returns_default_for_corrupt_json() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("sidebar", "{not json").expect("raw write");
        let store = store_with(&storage);
        assert_eq!(
            store.get("sidebar", json!({"collapsed": false})),
            json!({"collapsed": false})
        );
    }

    #[test]
    fn get_returns_default_when_stored_shape_mismatches() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("count", "\"seven\"").expect("raw write");
        let store = store_with(&storage);
        assert_eq!(store.get("count", 0_u32), 0);
    }

    #[test]
    fn set_get_remove_round_trip_json_values() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(&storage);

        store.set("filters", &json!({"type": "StreetLight", "active": true}));
        assert_eq!(
            storage.raw("filters").as_deref(),
            Some("{\"type\":\"StreetLight\",\"active\":true}")
        );
        assert_eq!(
            store.get("filters", Value::Null),
            json!({"type": "StreetLight", "active": true})
        );

        store.remove("filters");
        assert_eq!(store.get("filters", Value::Null), Value::Null);
    }

    #[test]
    fn quota_failure_is_absorbed() {
        let storage = Rc::new(MemoryStorage::with_quota(8));
        let store = store_with(&storage);
        store.set("big", &"x".repeat(64));
        assert_eq!(storage.raw("big"), None);
        assert_eq!(store.get("big", String::from("fallback")), "fallback");
    }

    #[test]
    fn unavailable_backend_degrades_to_defaults() {
        let store = PreferenceStore::new(Rc::new(BrokenStorage), PREFERENCES_STORAGE_KEY);
        store.set("theme", &"dark");
        store.remove("theme");
        assert_eq!(store.load_preferences(), Preferences::default());
        assert_eq!(store.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn toggle_theme_persists_under_namespace_key() {
        let storage = Rc::new(MemoryStorage::new());
        let store = store_with(&storage);

        assert_eq!(store.toggle_theme(), Theme::Dark);
        assert_eq!(
            storage.raw(PREFERENCES_STORAGE_KEY).as_deref(),
            Some("{\"theme\":\"dark\"}")
        );
        assert_eq!(store.toggle_theme(), Theme::Light);
        assert_eq!(store.load_preferences().theme, Theme::Light);
    }
}
