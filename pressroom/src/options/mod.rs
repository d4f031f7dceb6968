// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Key/value settings store. Values are structured JSON; typed records are
//! decoded at this boundary so handlers never see raw option data.

pub mod migration;
pub mod yaml_store;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt;

pub use yaml_store::YamlOptionStore;

pub const ACTIVE_PLUGINS: &str = "active_plugins";
pub const CUSTOM_POST_TYPES: &str = "custom_post_types";
pub const CUSTOM_FIELD_GROUPS: &str = "custom_field_groups";
pub const LOGIN_SETTINGS: &str = "login_settings";
pub const CUSTOM_ADMIN_CSS: &str = "custom_admin_css";
pub const CUSTOM_FRONTEND_CSS: &str = "custom_frontend_css";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}

pub trait OptionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces the whole value stored under `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed access on top of [`OptionStore`].
pub trait OptionStoreExt {
    /// Decodes the option, falling back to `T::default()` when unset.
    fn get_typed<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError>;

    fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;
}

impl<S: OptionStore + ?Sized> OptionStoreExt for S {
    fn get_typed<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value).map_err(|err| {
                StoreError::new(format!("Option '{}' has an unexpected shape: {}", key, err))
            }),
        }
    }

    fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)
            .map_err(|err| StoreError::new(format!("Failed to encode option '{}': {}", key, err)))?;
        self.set(key, value)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryOptionStore;
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn get_typed_defaults_when_unset() {
        let store = MemoryOptionStore::default();
        let value: Vec<String> = store.get_typed(ACTIVE_PLUGINS).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn get_typed_rejects_wrong_shape() {
        let store = MemoryOptionStore::default();
        store.set(ACTIVE_PLUGINS, Value::from("not-a-list")).unwrap();
        let result: Result<Vec<String>, _> = store.get_typed(ACTIVE_PLUGINS);
        let error = result.expect_err("shape mismatch");
        assert!(error.to_string().contains("active_plugins"));
    }

    #[test]
    fn set_typed_round_trips_maps() {
        let store = MemoryOptionStore::default();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);
        store.set_typed("numbers", &map).unwrap();
        let loaded: BTreeMap<String, u32> = store.get_typed("numbers").unwrap();
        assert_eq!(loaded, map);
    }
}
