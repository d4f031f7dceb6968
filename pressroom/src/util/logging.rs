// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Rewrites the level of records whose target starts with `target_prefix`.
#[derive(Debug, Clone)]
pub struct LevelRule {
    pub target_prefix: String,
    pub from: Level,
    pub to: Level,
}

impl LevelRule {
    pub fn new(target_prefix: &str, from: Level, to: Level) -> Self {
        Self {
            target_prefix: target_prefix.to_string(),
            from,
            to,
        }
    }
}

struct LevelModifierLogger {
    inner: Logger,
    rules: Vec<LevelRule>,
}

impl LevelModifierLogger {
    fn effective_level(&self, target: &str, original: Level) -> Level {
        self.rules
            .iter()
            .find(|rule| rule.from == original && target.starts_with(&rule.target_prefix))
            .map(|rule| rule.to)
            .unwrap_or(original)
    }
}

impl Log for LevelModifierLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let level = self.effective_level(metadata.target(), metadata.level());
        let metadata = Metadata::builder()
            .level(level)
            .target(metadata.target())
            .build();
        self.inner.enabled(&metadata)
    }

    fn log(&self, record: &Record) {
        let level = self.effective_level(record.target(), record.level());
        let record = Record::builder()
            .level(level)
            .target(record.target())
            .args(*record.args())
            .module_path(record.module_path())
            .file(record.file())
            .line(record.line())
            .build();
        self.inner.log(&record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// env_logger backend with a UTC timestamp, honoring `RUST_LOG` overrides.
pub fn build_logger(level: LevelFilter) -> Logger {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build()
}

pub fn init_logger(rules: Vec<LevelRule>, logger: Logger) -> Result<(), SetLoggerError> {
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(LevelModifierLogger {
        inner: logger,
        rules,
    }))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Rules applied at startup: actix worker chatter is demoted to debug.
pub fn default_level_rules() -> Vec<LevelRule> {
    vec![
        LevelRule::new("actix_server", Level::Info, Level::Debug),
        LevelRule::new("rusqlite", Level::Info, Level::Debug),
    ]
}
