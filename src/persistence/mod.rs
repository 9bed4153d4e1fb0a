//! Save/load persistence
//!
//! JSON documents in LocalStorage on web; native builds keep nothing and
//! always fall back to defaults. Corrupt or missing data is never an error:
//! callers get `None` and start fresh.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Config document
pub const CONFIG_KEY: &str = "chaos_dig_config_v3";
/// Session history document
pub const HISTORY_KEY: &str = "chaos_dig_history_v1";
/// Progress snapshot (`ResourceState`)
pub const PROGRESS_KEY: &str = "chaos_dig_progress_v1";

/// Decode a JSON document, logging corrupt data
pub fn decode<T: DeserializeOwned>(key: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Discarding corrupt {}: {}", key, err);
            None
        }
    }
}

/// Load and decode a JSON document (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    let Some(storage) = storage else {
        log::warn!("LocalStorage unavailable, {} not loaded", key);
        return None;
    };
    let json = storage.get_item(key).ok().flatten()?;
    decode(key, &json)
}

/// Encode and store a JSON document (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(key: &str, value: &T) -> bool {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    let Some(storage) = storage else {
        log::warn!("LocalStorage unavailable, {} not saved", key);
        return false;
    };
    match serde_json::to_string(value) {
        Ok(json) => {
            if storage.set_item(key, &json).is_err() {
                log::warn!("Failed to write {}", key);
                return false;
            }
            log::debug!("Saved {}", key);
            true
        }
        Err(err) => {
            log::warn!("Failed to encode {}: {}", key, err);
            false
        }
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_key: &str) -> Option<T> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_key: &str, _value: &T) -> bool {
    // No-op for native
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ResourceState;

    #[test]
    fn test_decode_rejects_corrupt_json() {
        assert!(decode::<ResourceState>(PROGRESS_KEY, "{not json").is_none());
    }

    #[test]
    fn test_decode_partial_progress_uses_defaults() {
        let progress: Option<ResourceState> = decode(PROGRESS_KEY, r#"{"money": 99}"#);
        let progress = progress.unwrap_or_default();
        assert_eq!(progress.money, 99);
        assert_eq!(progress.pickaxe_tier, "wood");
    }
}
