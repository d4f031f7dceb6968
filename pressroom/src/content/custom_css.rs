// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::options::{CUSTOM_ADMIN_CSS, CUSTOM_FRONTEND_CSS, OptionStore, OptionStoreExt, StoreError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CssTarget {
    Admin,
    Frontend,
}

impl CssTarget {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(CssTarget::Admin),
            "frontend" => Some(CssTarget::Frontend),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CssTarget::Admin => "admin",
            CssTarget::Frontend => "frontend",
        }
    }

    pub fn option_key(&self) -> &'static str {
        match self {
            CssTarget::Admin => CUSTOM_ADMIN_CSS,
            CssTarget::Frontend => CUSTOM_FRONTEND_CSS,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CssTarget::Admin => "Admin CSS",
            CssTarget::Frontend => "Frontend CSS",
        }
    }
}

pub fn load(store: &dyn OptionStore, target: CssTarget) -> Result<String, StoreError> {
    store.get_typed(target.option_key())
}

/// Stores the stylesheet verbatim; an empty stylesheet clears the option.
pub fn save(store: &dyn OptionStore, target: CssTarget, css: &str) -> Result<(), StoreError> {
    if css.trim().is_empty() {
        return store.delete(target.option_key());
    }
    store.set_typed(target.option_key(), &css)
}

/// Makes stylesheet text safe to place inside a `<style>` element.
pub fn style_element_text(css: &str) -> String {
    css.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::memory::MemoryOptionStore;

    #[test]
    fn targets_map_to_their_own_option() {
        let store = MemoryOptionStore::default();
        save(&store, CssTarget::Admin, "#adminmenu { color: red; }").unwrap();
        assert_eq!(load(&store, CssTarget::Admin).unwrap(), "#adminmenu { color: red; }");
        assert_eq!(load(&store, CssTarget::Frontend).unwrap(), "");
    }

    #[test]
    fn blank_css_clears_option() {
        let store = MemoryOptionStore::default();
        save(&store, CssTarget::Frontend, "body{}").unwrap();
        save(&store, CssTarget::Frontend, "  \n").unwrap();
        assert_eq!(store.get(CUSTOM_FRONTEND_CSS).unwrap(), None);
    }

    #[test]
    fn target_parsing() {
        assert_eq!(CssTarget::parse("admin"), Some(CssTarget::Admin));
        assert_eq!(CssTarget::parse("login"), None);
        assert_eq!(CssTarget::Frontend.as_str(), "frontend");
    }

    #[test]
    fn closing_tags_cannot_end_style_element() {
        assert_eq!(
            style_element_text("a{}</style><script>"),
            "a{}<\\/style><script>"
        );
    }
}
