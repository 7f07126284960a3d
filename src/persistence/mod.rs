//! Save/load persistence
//!
//! Features:
//! - Key-value store abstraction (in-memory and file-backed)
//! - camelCase JSON save layout
//! - Corrupt or missing records fall back to defaults with a warning

pub mod save;
pub mod store;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use save::{SaveData, load_save, store_save};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Game state record
pub const STATE_KEY: &str = "merge_well_state";
/// Unlocked cosmetics record
pub const INVENTORY_KEY: &str = "merge_well_inventory";
/// Player preferences record
pub const SETTINGS_KEY: &str = "merge_well_settings";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Read and decode a record. `Ok(None)` when the key is absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, PersistenceError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write a record
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), PersistenceError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Load a record, falling back to `T::default()` when missing or unreadable
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match load_json(store, key) {
        Ok(Some(value)) => {
            log::info!("Loaded '{}'", key);
            value
        }
        Ok(None) => {
            log::info!("No '{}' record, using defaults", key);
            T::default()
        }
        Err(e) => {
            log::warn!("Discarding unreadable '{}' record: {}", key, e);
            T::default()
        }
    }
}
