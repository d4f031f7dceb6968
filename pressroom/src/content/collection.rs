// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    EmptyKey,
    DuplicateKey(String),
    MissingKey(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::EmptyKey => write!(f, "Identifier must not be empty"),
            CollectionError::DuplicateKey(key) => write!(f, "Identifier '{}' is already in use", key),
            CollectionError::MissingKey(key) => write!(f, "Identifier '{}' does not exist", key),
        }
    }
}

impl std::error::Error for CollectionError {}

/// Records keyed by slug, stored as one option value. Key uniqueness is
/// enforced here so every caller gets the same guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedCollection<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> KeyedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.entries.iter()
    }

    pub fn insert_new(&mut self, key: &str, record: T) -> Result<(), CollectionError> {
        if key.is_empty() {
            return Err(CollectionError::EmptyKey);
        }
        match self.entries.entry(key.to_string()) {
            btree_map::Entry::Occupied(_) => Err(CollectionError::DuplicateKey(key.to_string())),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    pub fn replace(&mut self, key: &str, record: T) -> Result<T, CollectionError> {
        match self.entries.get_mut(key) {
            Some(existing) => Ok(std::mem::replace(existing, record)),
            None => Err(CollectionError::MissingKey(key.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.entries.remove(key)
    }

    /// `base`, or `base-2`, `base-3`, ... whichever is free first.
    pub fn unique_key(&self, base: &str) -> String {
        if !self.entries.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|suffix| format!("{}-{}", base, suffix))
            .find(|candidate| !self.entries.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl<'a, T> IntoIterator for &'a KeyedCollection<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
