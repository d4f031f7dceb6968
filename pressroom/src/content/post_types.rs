// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::collection::{CollectionError, KeyedCollection};
use super::fields::{FieldDefinition, fields_from_form};
use super::naming;
use super::reserved::ReservedSlugs;
use super::{ContentError, ValidationErrors};
use crate::db::ContentQuery;
use crate::options::{CUSTOM_POST_TYPES, OptionStore, OptionStoreExt, StoreError};
use crate::util::FormData;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ICON: &str = "admin-post";
pub const ICONS: &[&str] = &[
    "admin-post",
    "admin-page",
    "book",
    "calendar",
    "cart",
    "format-video",
    "location",
    "portfolio",
    "products",
    "star-filled",
];
pub const MAX_SLUG_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostType {
    pub slug: String,
    pub label: String,
    pub label_plural: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_public() -> bool {
    true
}

pub type PostTypeCollection = KeyedCollection<PostType>;

/// Submitted editor values, kept verbatim so a rejected form can be redisplayed.
#[derive(Debug, Clone, Serialize)]
pub struct PostTypeInput {
    pub slug: String,
    pub label: String,
    pub label_plural: String,
    pub icon: String,
    pub public: bool,
    pub fields: Vec<FieldDefinition>,
}

impl Default for PostTypeInput {
    fn default() -> Self {
        Self {
            slug: String::new(),
            label: String::new(),
            label_plural: String::new(),
            icon: DEFAULT_ICON.to_string(),
            public: true,
            fields: Vec::new(),
        }
    }
}

impl PostTypeInput {
    pub fn from_record(record: &PostType) -> Self {
        Self {
            slug: record.slug.clone(),
            label: record.label.clone(),
            label_plural: record.label_plural.clone(),
            icon: record.icon.clone(),
            public: record.public,
            fields: record.fields.clone(),
        }
    }

    pub fn from_form(form: &FormData, errors: &mut ValidationErrors) -> Self {
        Self {
            slug: form.text("slug"),
            label: form.text("label"),
            label_plural: form.text("label_plural"),
            icon: form.text("icon"),
            public: form.flag("public"),
            fields: fields_from_form(form, errors),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTypeSummary {
    #[serde(flatten)]
    pub post_type: PostType,
    pub count: u64,
}

/// A content type a taxonomy or field group can attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeOption {
    pub slug: String,
    pub label: String,
}

pub const BUILTIN_CONTENT_TYPES: &[(&str, &str)] = &[("post", "Posts"), ("page", "Pages")];

pub fn load(store: &dyn OptionStore) -> Result<PostTypeCollection, StoreError> {
    store.get_typed(CUSTOM_POST_TYPES)
}

/// Built-in content types followed by every custom post type.
pub fn content_types(store: &dyn OptionStore) -> Result<Vec<ContentTypeOption>, StoreError> {
    let collection = load(store)?;
    let builtin = BUILTIN_CONTENT_TYPES
        .iter()
        .map(|(slug, label)| ContentTypeOption {
            slug: slug.to_string(),
            label: label.to_string(),
        });
    let custom = collection.values().map(|post_type| ContentTypeOption {
        slug: post_type.slug.clone(),
        label: post_type.label_plural.clone(),
    });
    Ok(builtin.chain(custom).collect())
}

fn save(store: &dyn OptionStore, collection: &PostTypeCollection) -> Result<(), StoreError> {
    store.set_typed(CUSTOM_POST_TYPES, collection)
}

/// Every post type with its current content count, ordered by slug.
pub fn list_with_counts(
    store: &dyn OptionStore,
    content: &dyn ContentQuery,
) -> Result<Vec<PostTypeSummary>, ContentError> {
    let collection = load(store)?;
    let counts = content.counts_by_type()?;
    Ok(collection
        .values()
        .map(|post_type| PostTypeSummary {
            count: counts.get(&post_type.slug).copied().unwrap_or(0),
            post_type: post_type.clone(),
        })
        .collect())
}

/// Validates the mutable attributes shared by create and edit.
fn build_record(slug: String, input: &PostTypeInput, errors: &mut ValidationErrors) -> PostType {
    if input.label.is_empty() {
        errors.push("Singular label is required.");
    }
    let label_plural = if input.label_plural.is_empty() {
        naming::pluralize(&input.label)
    } else {
        input.label_plural.clone()
    };
    let icon = if input.icon.is_empty() {
        DEFAULT_ICON.to_string()
    } else if ICONS.contains(&input.icon.as_str()) {
        input.icon.clone()
    } else {
        errors.push(format!("Unknown icon '{}'.", input.icon));
        input.icon.clone()
    };

    PostType {
        slug,
        label: input.label.clone(),
        label_plural,
        icon,
        public: input.public,
        fields: input.fields.clone(),
    }
}

/// Creates a post type. `errors` may already hold problems found while
/// reading the form; nothing is written unless the final list is empty.
pub fn create(
    store: &dyn OptionStore,
    reserved: &ReservedSlugs,
    input: &PostTypeInput,
    mut errors: ValidationErrors,
) -> Result<PostType, ContentError> {
    let mut collection = load(store)?;

    let slug = if input.slug.is_empty() {
        naming::slugify(&input.label)
    } else {
        naming::slugify(&input.slug)
    };
    let record = build_record(slug.clone(), input, &mut errors);

    if slug.is_empty() {
        if !input.label.is_empty() || !input.slug.is_empty() {
            errors.push("Slug must contain letters or digits.");
        }
    } else if slug.chars().count() > MAX_SLUG_CHARS {
        errors.push(format!(
            "Slug must be at most {} characters.",
            MAX_SLUG_CHARS
        ));
    } else if reserved.is_reserved(&slug) {
        errors.push(format!("The slug '{}' is reserved.", slug));
    } else if collection.contains_key(&slug) {
        errors.push(format!("A post type with slug '{}' already exists.", slug));
    }

    let record = errors.into_result(record)?;
    collection
        .insert_new(&slug, record.clone())
        .map_err(|err| match err {
            CollectionError::DuplicateKey(slug) => ContentError::Validation(
                ValidationErrors::single(format!(
                    "A post type with slug '{}' already exists.",
                    slug
                )),
            ),
            other => ContentError::Validation(ValidationErrors::single(other.to_string())),
        })?;
    save(store, &collection)?;
    Ok(record)
}

/// Updates everything except the slug, which is immutable after creation.
pub fn update(
    store: &dyn OptionStore,
    slug: &str,
    input: &PostTypeInput,
    mut errors: ValidationErrors,
) -> Result<PostType, ContentError> {
    let mut collection = load(store)?;
    if !collection.contains_key(slug) {
        return Err(ContentError::NotFound(format!("Post type '{}'", slug)));
    }

    let record = build_record(slug.to_string(), input, &mut errors);
    let record = errors.into_result(record)?;
    collection
        .replace(slug, record.clone())
        .map_err(|_| ContentError::NotFound(format!("Post type '{}'", slug)))?;
    save(store, &collection)?;
    Ok(record)
}

/// Removes a post type unless content of that type still exists.
pub fn delete(
    store: &dyn OptionStore,
    content: &dyn ContentQuery,
    slug: &str,
) -> Result<PostType, ContentError> {
    let mut collection = load(store)?;
    let record = collection
        .get(slug)
        .cloned()
        .ok_or_else(|| ContentError::NotFound(format!("Post type '{}'", slug)))?;

    let count = content.count_by_type(slug)?;
    if count > 0 {
        return Err(ContentError::InUse {
            count,
            label: record.label,
            label_plural: record.label_plural,
        });
    }

    collection.remove(slug);
    save(store, &collection)?;
    Ok(record)
}
