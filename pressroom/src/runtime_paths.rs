// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub plugins_dir: PathBuf,
    pub state_dir: PathBuf,
    pub state_sys_dir: PathBuf,
    pub options_file: PathBuf,
    pub database_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = canonicalize(&root_path, "runtime root")?;

        let config_file = root_canonical.join("config.yaml");
        ensure_file_writable(&config_file, "Config file must be writable")?;

        let plugins_dir = root_canonical.join("plugins");
        let state_dir = root_canonical.join("state");
        let state_sys_dir = state_dir.join("sys");
        let logs_dir = root_canonical.join("logs");

        ensure_dir_exists(&plugins_dir)?;
        ensure_dir_exists(&state_dir)?;
        ensure_dir_exists(&state_sys_dir)?;

        let plugins_dir = canonicalize(&plugins_dir, "plugins directory")?;
        let state_dir = canonicalize(&state_dir, "state directory")?;
        let state_sys_dir = canonicalize(&state_sys_dir, "state/sys directory")?;

        Ok(Self {
            root: root_canonical,
            config_file,
            plugins_dir,
            options_file: state_sys_dir.join("options.yaml"),
            database_file: state_sys_dir.join("content.sqlite3"),
            state_dir,
            state_sys_dir,
            logs_dir,
        })
    }
}

fn canonicalize(path: &Path, label: &str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize {} '{}': {}",
            label,
            path.display(),
            e
        ))
    })
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    ensure_dir_writable(path, "Directory must be writable")?;
    Ok(())
}

fn ensure_dir_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a directory): {}",
            context,
            path.display()
        )));
    }

    let probe_name = format!(".pressroom-write-check-{}", Uuid::new_v4());
    let probe_path = path.join(probe_name);

    let probe_result = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe_path);

    match probe_result {
        Ok(_) => {
            if let Err(err) = fs::remove_file(&probe_path) {
                return Err(ConfigError::ValidationError(format!(
                    "{} (unable to clean probe file {}): {}",
                    context,
                    probe_path.display(),
                    err
                )));
            }
            Ok(())
        }
        Err(err) => Err(ConfigError::ValidationError(format!(
            "{} ({}): {}",
            context,
            path.display(),
            err
        ))),
    }
}

fn ensure_file_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a file): {}",
            context,
            path.display()
        )));
    }

    fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|err| {
            ConfigError::ValidationError(format!("{} ({}): {}", context, path.display(), err))
        })
}
