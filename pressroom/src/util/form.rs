// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Urlencoded form body kept as ordered pairs so repeated fields
/// (`post_types`, `field_label`, ...) survive decoding.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First raw value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value for `name`, trimmed; empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(str::trim).unwrap_or_default().to_string()
    }

    /// First value for `name` with surrounding whitespace kept (textareas).
    pub fn raw(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Checkbox semantics: present with any value other than `0`/`false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(value) if value != "0" && value != "false")
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::FormData;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn repeated_fields_keep_order() {
        let data = form(&[("post_types", "post"), ("name", "x"), ("post_types", "book")]);
        assert_eq!(data.all("post_types"), vec!["post", "book"]);
    }

    #[test]
    fn text_trims_and_defaults() {
        let data = form(&[("name", "  Genres ")]);
        assert_eq!(data.text("name"), "Genres");
        assert_eq!(data.text("missing"), "");
    }

    #[test]
    fn flag_follows_checkbox_presence() {
        let data = form(&[("public", "1"), ("hierarchical", "0")]);
        assert!(data.flag("public"));
        assert!(!data.flag("hierarchical"));
        assert!(!data.flag("absent"));
    }
}
