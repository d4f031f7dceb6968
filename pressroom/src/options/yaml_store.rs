// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::migration::{self, CURRENT_SCHEMA_VERSION};
use super::{OptionStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const MAX_TEMP_ATTEMPTS: u32 = 100;

/// On-disk envelope of the options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

impl Default for OptionsDocument {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            options: BTreeMap::new(),
        }
    }
}

/// Options persisted as one YAML document. Reads are served from the
/// in-memory snapshot; every write rewrites the file atomically before the
/// snapshot is swapped.
pub struct YamlOptionStore {
    options_file: PathBuf,
    options: RwLock<BTreeMap<String, Value>>,
}

impl YamlOptionStore {
    pub fn open(options_file: PathBuf) -> Result<Self, StoreError> {
        let document = Self::load_from_disk(&options_file)?;
        Ok(Self {
            options_file,
            options: RwLock::new(document.options),
        })
    }

    pub fn path(&self) -> &Path {
        &self.options_file
    }

    pub fn snapshot(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        self.options
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::new("Option store lock poisoned"))
    }

    fn load_from_disk(options_file: &Path) -> Result<OptionsDocument, StoreError> {
        let raw = match read_yaml_value(options_file)? {
            Some(raw) => raw,
            None => return Ok(OptionsDocument::default()),
        };
        let outcome = migration::migrate(raw)?;
        if outcome.migrated {
            write_document(options_file, &outcome.document)?;
            log::info!(
                "Migrated options file {} from schema {} to {}",
                options_file.display(),
                outcome.from_version,
                outcome.document.schema_version
            );
        }
        Ok(outcome.document)
    }

    /// Applies `edit` to a copy of the options while holding the write lock,
    /// writes the copy to disk, then swaps it in. Writers are serialized so an
    /// update to one key never drops a concurrent update to another.
    fn update<F>(&self, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, Value>) -> bool,
    {
        let mut guard = self
            .options
            .write()
            .map_err(|_| StoreError::new("Option store lock poisoned"))?;
        let mut options = guard.clone();
        if !edit(&mut options) {
            return Ok(());
        }
        let document = OptionsDocument {
            schema_version: CURRENT_SCHEMA_VERSION,
            options,
        };
        write_document(&self.options_file, &document)?;
        *guard = document.options;
        Ok(())
    }
}

impl OptionStore for YamlOptionStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.options
            .read()
            .map(|guard| guard.get(key).cloned())
            .map_err(|_| StoreError::new("Option store lock poisoned"))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(|options| {
            options.insert(key.to_string(), value);
            true
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.update(|options| options.remove(key).is_some())
    }
}

fn read_yaml_value(path: &Path) -> Result<Option<Value>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|err| StoreError::new(format!("Failed to read options file: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let decoded = serde_yaml::from_str(&content)
        .map_err(|err| StoreError::new(format!("Failed to parse options file: {}", err)))?;
    Ok(Some(decoded))
}

fn write_document(path: &Path, document: &OptionsDocument) -> Result<(), StoreError> {
    let content = serde_yaml::to_string(document)
        .map_err(|err| StoreError::new(format!("Failed to serialize options: {}", err)))?;
    write_atomic(path, content.as_bytes())
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::new("Options file path has no parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::new("Options file name is not valid UTF-8"))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name)?;

    #[cfg(unix)]
    {
        if let Ok(metadata) = fs::metadata(path)
            && let Err(err) = fs::set_permissions(&temp_path, metadata.permissions())
        {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::new(format!(
                "Failed to set temp options file permissions: {}",
                err
            )));
        }
    }

    let written = file
        .write_all(bytes)
        .and_then(|()| file.sync_all())
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::new(format!(
            "Failed to replace options file: {}",
            err
        )));
    }

    #[cfg(unix)]
    {
        if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
            log::warn!("Options directory sync failed: {}", err);
        }
    }

    Ok(())
}

fn create_temp_file(parent: &Path, file_name: &str) -> Result<(fs::File, PathBuf), StoreError> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_name = format!(".{}.tmp.{}.{}", file_name, std::process::id(), attempt);
        let temp_path = parent.join(temp_name);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::new(format!(
                    "Failed to create temp options file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::new(
        "Failed to create temp options file after multiple attempts",
    ))
}
