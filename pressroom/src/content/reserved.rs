// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use std::collections::BTreeSet;

/// Identifiers that collide with built-in content types, taxonomies,
/// query variables or top-level routes.
const BUILTIN_RESERVED: &[&str] = &[
    "admin",
    "attachment",
    "author",
    "category",
    "comment",
    "comments",
    "date",
    "feed",
    "field-group",
    "login",
    "media",
    "nav-menu",
    "page",
    "paged",
    "plugin",
    "post",
    "post-format",
    "post-type",
    "revision",
    "search",
    "tag",
    "taxonomy",
    "term",
    "theme",
    "type",
    "user",
    "year",
];

#[derive(Debug, Clone)]
pub struct ReservedSlugs {
    entries: BTreeSet<String>,
}

impl ReservedSlugs {
    pub fn from_config(config: &ValidatedConfig) -> Self {
        Self::new(Some(config.admin.path.as_str()))
    }

    /// The first segment of the admin path is reserved too, so a custom
    /// type can never shadow the admin surface.
    pub fn new(admin_path: Option<&str>) -> Self {
        let mut entries: BTreeSet<String> =
            BUILTIN_RESERVED.iter().map(|slug| slug.to_string()).collect();
        if let Some(segment) = admin_path
            .and_then(|path| path.trim_matches('/').split('/').next())
            .filter(|segment| !segment.is_empty())
        {
            entries.insert(segment.to_ascii_lowercase());
        }
        Self { entries }
    }

    pub fn is_reserved(&self, slug: &str) -> bool {
        let normalized = slug.trim().to_ascii_lowercase();
        !normalized.is_empty() && self.entries.contains(&normalized)
    }
}

impl Default for ReservedSlugs {
    fn default() -> Self {
        Self::new(None)
    }
}
