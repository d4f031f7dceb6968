// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::ValidationErrors;
use super::naming;
use crate::util::FormData;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

pub const FIELD_TYPES: &[&str] = &[
    "text", "textarea", "number", "email", "url", "select", "checkbox", "date", "image",
    "wysiwyg",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub label: String,
    pub name: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
}

fn default_field_type() -> String {
    "text".to_string()
}

/// Reads the repeated `field_label` / `field_name` / `field_type` rows of an
/// editor form. `field_required` carries the zero-based indexes of required
/// rows. Fully blank rows are dropped. The returned rows are what the form
/// should redisplay; problems are appended to `errors`.
pub fn fields_from_form(form: &FormData, errors: &mut ValidationErrors) -> Vec<FieldDefinition> {
    let labels = form.all("field_label");
    let names = form.all("field_name");
    let types = form.all("field_type");
    let required: HashSet<usize> = form
        .all("field_required")
        .into_iter()
        .filter_map(|value| value.trim().parse().ok())
        .collect();

    let rows = labels.len().max(names.len()).max(types.len());
    let mut fields = Vec::new();
    let mut seen_names = BTreeSet::new();

    for index in 0..rows {
        let label = labels.get(index).map(|v| v.trim()).unwrap_or_default();
        let raw_name = names.get(index).map(|v| v.trim()).unwrap_or_default();
        if label.is_empty() && raw_name.is_empty() {
            continue;
        }
        let row = index + 1;
        let field_type = types
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or("text");

        if label.is_empty() {
            errors.push(format!("Field {}: label is required.", row));
        }
        let name = if raw_name.is_empty() {
            naming::field_name(label)
        } else {
            naming::field_name(raw_name)
        };
        if name.is_empty() {
            errors.push(format!(
                "Field {}: name must contain letters or digits.",
                row
            ));
        } else if !seen_names.insert(name.clone()) {
            errors.push(format!("Field name '{}' is used more than once.", name));
        }
        if !FIELD_TYPES.contains(&field_type) {
            errors.push(format!("Field {}: unknown type '{}'.", row, field_type));
        }

        fields.push(FieldDefinition {
            label: label.to_string(),
            name,
            field_type: field_type.to_string(),
            required: required.contains(&index),
        });
    }

    fields
}
