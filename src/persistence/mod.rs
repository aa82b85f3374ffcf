//! Key/value JSON persistence
//!
//! - wasm32: browser LocalStorage, one entry per key
//! - native: `<ARCADE_DATA_DIR>/<key>.json`; without the variable nothing is
//!   stored and loads report "not found"

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Environment variable naming the native data directory
pub const DATA_DIR_ENV: &str = "ARCADE_DATA_DIR";

/// Load a value, `Ok(None)` when nothing is stored under `key`
pub fn read_json<T: DeserializeOwned>(key: &str) -> Result<Option<T>> {
    match backend::read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Store a value under `key`
pub fn write_json<T: Serialize>(key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    backend::write(key, &json)
}

/// Load a value or fall back to its default, logging why
pub fn load_or_default<T: DeserializeOwned + Default>(key: &str) -> T {
    match read_json(key) {
        Ok(Some(value)) => {
            log::info!("Loaded {key}");
            value
        }
        Ok(None) => {
            log::info!("No stored {key}, using defaults");
            T::default()
        }
        Err(e) => {
            log::warn!("Stored {key} unreadable ({e}), using defaults");
            T::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use crate::error::{Error, Result};

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| Error::Storage("LocalStorage unavailable".to_string()))
    }

    fn storage_key(key: &str) -> String {
        format!("arcade_cabinet_{key}")
    }

    pub fn read(key: &str) -> Result<Option<String>> {
        storage()?
            .get_item(&storage_key(key))
            .map_err(|_| Error::Storage(format!("read of {key} rejected")))
    }

    pub fn write(key: &str, json: &str) -> Result<()> {
        storage()?
            .set_item(&storage_key(key), json)
            .map_err(|_| Error::Storage(format!("write of {key} rejected")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use std::path::PathBuf;

    use super::DATA_DIR_ENV;
    use crate::error::Result;

    fn path_for(key: &str) -> Option<PathBuf> {
        std::env::var_os(DATA_DIR_ENV).map(|dir| PathBuf::from(dir).join(format!("{key}.json")))
    }

    pub fn read(key: &str) -> Result<Option<String>> {
        let Some(path) = path_for(key) else {
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(key: &str, json: &str) -> Result<()> {
        let Some(path) = path_for(key) else {
            log::debug!("{DATA_DIR_ENV} unset, not saving {key}");
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Write then rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}
