// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::collection::KeyedCollection;
use super::fields::{FieldDefinition, fields_from_form};
use super::naming;
use super::post_types::{self, ContentTypeOption};
use super::{ContentError, ValidationErrors};
use crate::options::{CUSTOM_FIELD_GROUPS, OptionStore, OptionStoreExt, StoreError};
use crate::util::FormData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub locations: BTreeSet<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

pub type FieldGroupCollection = KeyedCollection<FieldGroup>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldGroupInput {
    pub title: String,
    pub locations: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

impl FieldGroupInput {
    pub fn from_record(record: &FieldGroup) -> Self {
        Self {
            title: record.title.clone(),
            locations: record.locations.iter().cloned().collect(),
            fields: record.fields.clone(),
        }
    }

    pub fn from_form(form: &FormData, errors: &mut ValidationErrors) -> Self {
        Self {
            title: form.text("title"),
            locations: form
                .all("locations")
                .into_iter()
                .map(str::trim)
                .filter(|location| !location.is_empty())
                .map(str::to_string)
                .collect(),
            fields: fields_from_form(form, errors),
        }
    }
}

pub fn load(store: &dyn OptionStore) -> Result<FieldGroupCollection, StoreError> {
    store.get_typed(CUSTOM_FIELD_GROUPS)
}

fn save(store: &dyn OptionStore, collection: &FieldGroupCollection) -> Result<(), StoreError> {
    store.set_typed(CUSTOM_FIELD_GROUPS, collection)
}

/// Every content type plus user profiles.
pub fn location_options(store: &dyn OptionStore) -> Result<Vec<ContentTypeOption>, StoreError> {
    let mut options = post_types::content_types(store)?;
    options.push(ContentTypeOption {
        slug: "user".to_string(),
        label: "Users".to_string(),
    });
    Ok(options)
}

fn build_record(
    id: String,
    input: &FieldGroupInput,
    known_locations: &BTreeSet<String>,
    errors: &mut ValidationErrors,
) -> FieldGroup {
    if input.title.is_empty() {
        errors.push("Title is required.");
    }
    let locations: BTreeSet<String> = input.locations.iter().cloned().collect();
    if locations.is_empty() {
        errors.push("Select at least one location.");
    }
    for location in &locations {
        if !known_locations.contains(location) {
            errors.push(format!("Unknown location '{}'.", location));
        }
    }
    FieldGroup {
        id,
        title: input.title.clone(),
        locations,
        fields: input.fields.clone(),
    }
}

/// Creates a group; its id comes from the title and is made unique with a
/// numeric suffix.
pub fn create(
    store: &dyn OptionStore,
    known_locations: &BTreeSet<String>,
    input: &FieldGroupInput,
    mut errors: ValidationErrors,
) -> Result<FieldGroup, ContentError> {
    let mut collection = load(store)?;
    let base = naming::slugify(&input.title);
    if base.is_empty() && !input.title.is_empty() {
        errors.push("Title must contain letters or digits.");
    }
    let id = collection.unique_key(&base);

    let record = build_record(id.clone(), input, known_locations, &mut errors);
    let record = errors.into_result(record)?;
    collection
        .insert_new(&id, record.clone())
        .map_err(|err| ContentError::Validation(ValidationErrors::single(err.to_string())))?;
    save(store, &collection)?;
    Ok(record)
}

pub fn update(
    store: &dyn OptionStore,
    known_locations: &BTreeSet<String>,
    id: &str,
    input: &FieldGroupInput,
    mut errors: ValidationErrors,
) -> Result<FieldGroup, ContentError> {
    let mut collection = load(store)?;
    if !collection.contains_key(id) {
        return Err(ContentError::NotFound(format!("Field group '{}'", id)));
    }
    let record = build_record(id.to_string(), input, known_locations, &mut errors);
    let record = errors.into_result(record)?;
    collection
        .replace(id, record.clone())
        .map_err(|_| ContentError::NotFound(format!("Field group '{}'", id)))?;
    save(store, &collection)?;
    Ok(record)
}

/// Removes the group. A missing id is a no-op and nothing is written.
pub fn delete(store: &dyn OptionStore, id: &str) -> Result<Option<FieldGroup>, ContentError> {
    let mut collection = load(store)?;
    let Some(removed) = collection.remove(id) else {
        return Ok(None);
    };
    save(store, &collection)?;
    Ok(Some(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::memory::MemoryOptionStore;

    fn known() -> BTreeSet<String> {
        ["post", "page", "user"].iter().map(|s| s.to_string()).collect()
    }

    fn input(title: &str) -> FieldGroupInput {
        FieldGroupInput {
            title: title.to_string(),
            locations: vec!["post".to_string()],
            fields: vec![FieldDefinition {
                label: "Question".to_string(),
                name: "question".to_string(),
                field_type: "text".to_string(),
                required: true,
            }],
        }
    }

    #[test]
    fn ids_are_unique_within_the_option() {
        let store = MemoryOptionStore::default();
        let first = create(&store, &known(), &input("FAQ"), ValidationErrors::new()).unwrap();
        let second = create(&store, &known(), &input("FAQ"), ValidationErrors::new()).unwrap();
        assert_eq!(first.id, "faq");
        assert_eq!(second.id, "faq-2");
        assert_eq!(load(&store).unwrap().len(), 2);
    }

    #[test]
    fn delete_faq_removes_it_and_absent_is_a_no_op() {
        let store = MemoryOptionStore::default();
        create(&store, &known(), &input("FAQ"), ValidationErrors::new()).unwrap();
        create(&store, &known(), &input("Specs"), ValidationErrors::new()).unwrap();

        let removed = delete(&store, "faq").unwrap();
        assert_eq!(removed.map(|g| g.id), Some("faq".to_string()));
        let collection = load(&store).unwrap();
        assert!(!collection.contains_key("faq"));
        assert!(collection.contains_key("specs"));

        assert_eq!(delete(&store, "faq").unwrap(), None);
    }

    #[test]
    fn delete_absent_does_not_write() {
        let store = MemoryOptionStore::failing();
        assert_eq!(delete(&store, "faq").unwrap(), None);
    }

    #[test]
    fn validation_covers_title_and_locations() {
        let store = MemoryOptionStore::default();
        let bad = FieldGroupInput {
            title: String::new(),
            locations: vec!["galaxy".to_string()],
            fields: Vec::new(),
        };
        match create(&store, &known(), &bad, ValidationErrors::new()) {
            Err(ContentError::Validation(errors)) => assert_eq!(
                errors.messages(),
                ["Title is required.".to_string(), "Unknown location 'galaxy'.".to_string()]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(load(&store).unwrap().is_empty());
    }

    #[test]
    fn update_keeps_id_and_replaces_fields() {
        let store = MemoryOptionStore::default();
        create(&store, &known(), &input("FAQ"), ValidationErrors::new()).unwrap();
        let mut edit = input("Frequently Asked");
        edit.locations = vec!["page".to_string(), "user".to_string()];
        edit.fields.clear();

        let updated = update(&store, &known(), "faq", &edit, ValidationErrors::new()).unwrap();
        assert_eq!(updated.id, "faq");
        assert_eq!(updated.title, "Frequently Asked");
        assert!(updated.fields.is_empty());
        assert_eq!(updated.locations.len(), 2);
    }

    #[test]
    fn location_options_include_custom_types_and_users() {
        let store = MemoryOptionStore::default();
        let slugs: Vec<_> = location_options(&store)
            .unwrap()
            .into_iter()
            .map(|option| option.slug)
            .collect();
        assert_eq!(slugs, ["post", "page", "user"]);
    }
}
