// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fmt;
use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::content::plugins::PluginRegistry;
use crate::content::reserved::ReservedSlugs;
use crate::db::{Database, DbError};
use crate::options::{OptionStore, StoreError, YamlOptionStore};
use crate::runtime_paths::RuntimePaths;
use crate::templates::{MiniJinjaEngine, TemplateEngine};
use crate::util::{CsrfTokenStore, FlashStore};

#[derive(Debug)]
pub enum AppStateError {
    Options(StoreError),
    Database(DbError),
}

impl fmt::Display for AppStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppStateError::Options(err) => write!(f, "Failed to open options store: {}", err),
            AppStateError::Database(err) => write!(f, "Failed to open content database: {}", err),
        }
    }
}

impl std::error::Error for AppStateError {}

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub options: Arc<dyn OptionStore>,
    pub database: Arc<Database>,
    pub plugins: PluginRegistry,
    pub reserved: ReservedSlugs,
    pub csrf: CsrfTokenStore,
    pub flash: FlashStore,
    pub runtime_paths: RuntimePaths,
}

impl AppState {
    pub fn new(
        config: &ValidatedConfig,
        runtime_paths: RuntimePaths,
        options: Arc<dyn OptionStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            options,
            database,
            plugins: PluginRegistry::new(runtime_paths.plugins_dir.clone()),
            reserved: ReservedSlugs::from_config(config),
            csrf: CsrfTokenStore::new(),
            flash: FlashStore::new(),
            runtime_paths,
        }
    }

    /// Opens the options file (migrating it when needed) and the content database
    /// under the runtime root.
    pub fn open(config: &ValidatedConfig, runtime_paths: RuntimePaths) -> Result<Self, AppStateError> {
        let options = YamlOptionStore::open(runtime_paths.options_file.clone())
            .map_err(AppStateError::Options)?;
        let database =
            Database::open(&runtime_paths.database_file).map_err(AppStateError::Database)?;
        Ok(Self::new(
            config,
            runtime_paths,
            Arc::new(options),
            Arc::new(database),
        ))
    }
}
