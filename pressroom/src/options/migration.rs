// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Options file schema upgrades.
//!
//! Version 1 is a bare key/value map. Collections may be stored as arrays,
//! post types may lack `label_plural`, and login flags are `"1"`/`"0"`
//! strings. Version 2 wraps the map in `{schema_version, options}` and
//! normalizes all of the above.

use super::yaml_store::OptionsDocument;
use super::{CUSTOM_FIELD_GROUPS, CUSTOM_POST_TYPES, LOGIN_SETTINGS, StoreError};
use crate::content::{login_theme, naming};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug)]
pub struct MigrationOutcome {
    pub document: OptionsDocument,
    pub from_version: u32,
    pub migrated: bool,
}

pub fn migrate(raw: Value) -> Result<MigrationOutcome, StoreError> {
    let (from_version, mut options) = split_envelope(raw)?;
    if from_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::new(format!(
            "Options file schema version {} is newer than supported version {}",
            from_version, CURRENT_SCHEMA_VERSION
        )));
    }
    if from_version < 2 {
        upgrade_v1_to_v2(&mut options);
    }
    Ok(MigrationOutcome {
        document: OptionsDocument {
            schema_version: CURRENT_SCHEMA_VERSION,
            options,
        },
        from_version,
        migrated: from_version != CURRENT_SCHEMA_VERSION,
    })
}

fn split_envelope(raw: Value) -> Result<(u32, BTreeMap<String, Value>), StoreError> {
    let Value::Object(mut map) = raw else {
        return Err(StoreError::new("Options file must contain a mapping"));
    };
    let Some(version) = map.get("schema_version") else {
        return Ok((1, map.into_iter().collect()));
    };
    let version = version
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v >= 1)
        .ok_or_else(|| StoreError::new("Options file has an invalid schema_version"))?;
    let options = match map.remove("options") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(options)) => options.into_iter().collect(),
        Some(_) => return Err(StoreError::new("Options file 'options' must be a mapping")),
    };
    Ok((version, options))
}

fn upgrade_v1_to_v2(options: &mut BTreeMap<String, Value>) {
    if let Some(value) = options.get_mut(CUSTOM_POST_TYPES) {
        let mut post_types = keyed_by(value.take(), "slug", "label");
        for entry in post_types.values_mut() {
            if let Value::Object(record) = entry {
                infer_label_plural(record);
            }
        }
        *value = Value::Object(post_types);
    }
    if let Some(value) = options.get_mut(CUSTOM_FIELD_GROUPS) {
        *value = Value::Object(keyed_by(value.take(), "id", "title"));
    }
    if let Some(Value::Object(settings)) = options.get_mut(LOGIN_SETTINGS) {
        for (key, value) in settings.iter_mut() {
            if login_theme::is_flag_key(key)
                && let Some(flag) = legacy_flag(value)
            {
                *value = Value::Bool(flag);
            }
        }
    }
}

/// Normalizes a collection to a map keyed by `key_field`. Array entries
/// without a key get one slugified from `name_field`; map entries get their
/// key copied into the record.
fn keyed_by(value: Value, key_field: &str, name_field: &str) -> Map<String, Value> {
    let entries: Vec<(Option<String>, Value)> = match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        _ => Vec::new(),
    };

    let mut keyed = Map::new();
    for (map_key, entry) in entries {
        let Value::Object(mut record) = entry else {
            continue;
        };
        let key = record
            .get(key_field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|k| !k.is_empty())
            .or(map_key)
            .or_else(|| {
                record
                    .get(name_field)
                    .and_then(Value::as_str)
                    .map(naming::slugify)
            })
            .filter(|k| !k.is_empty());
        let Some(key) = key else {
            log::warn!("Dropping {} entry without an identifier during migration", key_field);
            continue;
        };
        record.insert(key_field.to_string(), Value::String(key.clone()));
        keyed.insert(key, Value::Object(record));
    }
    keyed
}

fn infer_label_plural(record: &mut Map<String, Value>) {
    let has_plural = record
        .get("label_plural")
        .and_then(Value::as_str)
        .is_some_and(|plural| !plural.trim().is_empty());
    if has_plural {
        return;
    }
    let label = record
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    record.insert(
        "label_plural".to_string(),
        Value::String(naming::pluralize(&label)),
    );
}

fn legacy_flag(value: &Value) -> Option<bool> {
    match value {
        Value::String(text) => match text.trim() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_map_is_wrapped_and_upgraded() {
        let outcome = migrate(json!({
            "custom_post_types": [
                {"slug": "book", "label": "Book"},
                {"slug": "movie", "label": "Movie", "label_plural": "Films"}
            ],
            "custom_field_groups": [{"title": "FAQ Items", "locations": ["post"]}],
            "login_settings": {"logo_enabled": "0", "show_remember_me": "1", "button_label": "1"}
        }))
        .unwrap();

        assert!(outcome.migrated);
        assert_eq!(outcome.from_version, 1);
        assert_eq!(outcome.document.schema_version, CURRENT_SCHEMA_VERSION);

        let options = &outcome.document.options;
        assert_eq!(options[CUSTOM_POST_TYPES]["book"]["label_plural"], json!("Books"));
        assert_eq!(options[CUSTOM_POST_TYPES]["movie"]["label_plural"], json!("Films"));
        assert_eq!(options[CUSTOM_FIELD_GROUPS]["faq-items"]["id"], json!("faq-items"));
        assert_eq!(options[LOGIN_SETTINGS]["logo_enabled"], json!(false));
        assert_eq!(options[LOGIN_SETTINGS]["show_remember_me"], json!(true));
        assert_eq!(options[LOGIN_SETTINGS]["button_label"], json!("1"));
    }

    #[test]
    fn map_keys_fill_missing_identifiers() {
        let outcome = migrate(json!({
            "custom_post_types": {"recipe": {"label": "Recipe"}}
        }))
        .unwrap();
        let record = &outcome.document.options[CUSTOM_POST_TYPES]["recipe"];
        assert_eq!(record["slug"], json!("recipe"));
        assert_eq!(record["label_plural"], json!("Recipes"));
    }

    #[test]
    fn current_envelope_is_untouched() {
        let raw = json!({
            "schema_version": CURRENT_SCHEMA_VERSION,
            "options": {"custom_admin_css": "body{}"}
        });
        let outcome = migrate(raw).unwrap();
        assert!(!outcome.migrated);
        assert_eq!(outcome.document.options["custom_admin_css"], json!("body{}"));
    }

    #[test]
    fn newer_versions_and_non_maps_are_rejected() {
        assert!(migrate(json!({"schema_version": 99, "options": {}})).is_err());
        assert!(migrate(json!(["not", "a", "map"])).is_err());
        assert!(migrate(json!({"schema_version": "two"})).is_err());
    }
}
