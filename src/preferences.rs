use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Raw key-value persistence. Implementations swallow their own failures:
/// an unavailable store reads as empty and ignores writes.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.write(key, value);
        storage
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// A value that can live in the preference store as a string.
pub trait PreferenceValue: Sized + Copy {
    fn decode(raw: &str) -> Option<Self>;
    fn encode(self) -> &'static str;
}

#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn StorageBackend>,
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::default()))
    }

    pub fn get(&self, key: &str, allowed: Option<&[&str]>, default: &str) -> String {
        self.backend
            .read(key)
            .filter(|value| allowed.map_or(true, |allowed| allowed.contains(&value.as_str())))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.backend.write(key, value);
    }

    pub fn load<T: PreferenceValue>(&self, key: &str, default: T) -> T {
        self.backend
            .read(key)
            .and_then(|raw| T::decode(&raw))
            .unwrap_or(default)
    }

    pub fn save<T: PreferenceValue>(&self, key: &str, value: T) {
        self.backend.write(key, value.encode());
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::StorageBackend;
    use web_sys::{window, Storage};

    fn local_storage() -> Option<Storage> {
        window()?.local_storage().ok().flatten()
    }

    pub struct LocalStorage;

    impl StorageBackend for LocalStorage {
        fn read(&self, key: &str) -> Option<String> {
            local_storage()?.get_item(key).ok().flatten()
        }

        fn write(&self, key: &str, value: &str) {
            if let Some(storage) = local_storage() {
                let _ = storage.set_item(key, value);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_stored_value_when_allowed() {
        let store = PreferenceStore::new(Rc::new(MemoryStorage::with_entry("language", "en")));

        assert_eq!(store.get("language", Some(&["de", "en"]), "de"), "en");
    }

    #[test]
    fn get_rejects_values_outside_allowed_set() {
        let store = PreferenceStore::new(Rc::new(MemoryStorage::with_entry("language", "fr")));

        assert_eq!(store.get("language", Some(&["de", "en"]), "de"), "de");
    }

    #[test]
    fn missing_key_yields_default() {
        let store = PreferenceStore::in_memory();

        assert_eq!(store.get("darkMode", None, "false"), "false");
    }

    #[test]
    fn set_then_get_round_trips_through_shared_backend() {
        let backend: Rc<dyn StorageBackend> = Rc::new(MemoryStorage::default());
        let writer = PreferenceStore::new(Rc::clone(&backend));
        writer.set("darkMode", "true");

        let reloaded = PreferenceStore::new(backend);
        assert_eq!(reloaded.get("darkMode", Some(&["true", "false"]), "false"), "true");
    }
}
