// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::ContentError;
use crate::options::{ACTIVE_PLUGINS, OptionStore, OptionStoreExt, StoreError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

const MANIFEST_FILE: &str = "plugin.yaml";

static PLUGIN_SLUG_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$"));

fn is_valid_slug(slug: &str) -> bool {
    match PLUGIN_SLUG_REGEX.as_ref() {
        Ok(regex) => regex.is_match(slug),
        Err(err) => {
            log::error!("Plugin slug regex failed to compile: {}", err);
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct PluginManifest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    author_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plugin {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub author_uri: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    /// Unknown or missing values show everything.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("active") => StatusFilter::Active,
            Some("inactive") => StatusFilter::Inactive,
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }

    fn matches(&self, plugin: &Plugin) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => plugin.active,
            StatusFilter::Inactive => !plugin.active,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PluginCounts {
    pub all: usize,
    pub active: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginListing {
    pub plugins: Vec<Plugin>,
    pub counts: PluginCounts,
    pub status: StatusFilter,
}

/// Plugins installed under `<root>/plugins/<slug>/plugin.yaml`.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    plugins_dir: PathBuf,
}

impl PluginRegistry {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    fn manifest_path(&self, slug: &str) -> PathBuf {
        self.plugins_dir.join(slug).join(MANIFEST_FILE)
    }

    fn read_manifest(&self, slug: &str) -> Result<PluginManifest, String> {
        if !is_valid_slug(slug) {
            return Err("Plugin not found".to_string());
        }
        let path = self.manifest_path(slug);
        let content = fs::read_to_string(&path).map_err(|err| {
            log::debug!("Plugin manifest {} unreadable: {}", path.display(), err);
            "Plugin not found".to_string()
        })?;
        serde_yaml::from_str(&content).map_err(|err| {
            log::warn!("Plugin manifest {} is invalid: {}", path.display(), err);
            "Plugin manifest is invalid".to_string()
        })
    }

    /// Installed plugins ordered by slug. Entries with a broken manifest are skipped.
    pub fn discover(&self) -> Vec<(String, Plugin)> {
        let entries = match fs::read_dir(&self.plugins_dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(
                    "Plugins directory {} unreadable: {}",
                    self.plugins_dir.display(),
                    err
                );
                return Vec::new();
            }
        };

        let mut slugs: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|slug| is_valid_slug(slug))
            .collect();
        slugs.sort();

        slugs
            .into_iter()
            .filter_map(|slug| match self.read_manifest(&slug) {
                Ok(manifest) => Some((slug.clone(), plugin_from(slug, manifest, false))),
                Err(_) => None,
            })
            .collect()
    }

    pub fn list(
        &self,
        store: &dyn OptionStore,
        status: StatusFilter,
    ) -> Result<PluginListing, StoreError> {
        let active = active_slugs(store)?;
        let mut counts = PluginCounts::default();
        let mut plugins = Vec::new();
        for (slug, mut plugin) in self.discover() {
            plugin.active = active.contains(&slug);
            counts.all += 1;
            if plugin.active {
                counts.active += 1;
            } else {
                counts.inactive += 1;
            }
            if status.matches(&plugin) {
                plugins.push(plugin);
            }
        }
        Ok(PluginListing {
            plugins,
            counts,
            status,
        })
    }

    /// Flips the activation flag and returns the new state.
    pub fn toggle(&self, store: &dyn OptionStore, slug: &str) -> Result<bool, ContentError> {
        let mut active = active_slugs(store)?;
        if active.remove(slug) {
            store.set_typed(ACTIVE_PLUGINS, &active)?;
            log::info!("Plugin deactivated: {}", slug);
            return Ok(false);
        }

        self.read_manifest(slug).map_err(ContentError::Plugin)?;
        active.insert(slug.to_string());
        store.set_typed(ACTIVE_PLUGINS, &active)?;
        log::info!("Plugin activated: {}", slug);
        Ok(true)
    }
}

fn plugin_from(slug: String, manifest: PluginManifest, active: bool) -> Plugin {
    Plugin {
        slug,
        name: manifest.name,
        description: manifest.description,
        version: manifest.version,
        author: manifest.author,
        author_uri: manifest.author_uri,
        active,
    }
}

pub fn active_slugs(store: &dyn OptionStore) -> Result<BTreeSet<String>, StoreError> {
    store.get_typed(ACTIVE_PLUGINS)
}
