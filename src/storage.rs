//! Browser Storage
//!
//! `KeyValueStore` over `window.localStorage`.

use std::rc::Rc;

use board_core::{KeyValueStore, MemoryStore};
use web_sys::Storage;

pub struct BrowserStore {
    storage: Storage,
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log::warn!("localStorage rejected write to {}", key);
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// Local storage when available, otherwise an in-memory store for this tab
pub fn open() -> Rc<dyn KeyValueStore> {
    match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        Some(storage) => Rc::new(BrowserStore { storage }),
        None => {
            log::warn!("localStorage unavailable, state will not persist");
            Rc::new(MemoryStore::new())
        }
    }
}
