// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::naming;
use super::reserved::ReservedSlugs;
use super::{ContentError, ValidationErrors};
use crate::db::{Database, DbError, TaxonomyRow};
use crate::util::FormData;
use serde::Serialize;
use std::collections::BTreeSet;

pub const MAX_SLUG_CHARS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    /// `None` for compiled-in taxonomies.
    pub id: Option<i64>,
    pub name: String,
    pub singular: String,
    pub slug: String,
    pub description: String,
    pub hierarchical: bool,
    pub post_types: BTreeSet<String>,
    pub builtin: bool,
}

impl Taxonomy {
    fn from_row(row: TaxonomyRow) -> Self {
        Self {
            id: Some(row.id),
            name: row.name,
            singular: row.singular,
            slug: row.slug,
            description: row.description,
            hierarchical: row.hierarchical,
            post_types: row.post_types.into_iter().collect(),
            builtin: false,
        }
    }

    fn to_row(&self, id: i64) -> TaxonomyRow {
        TaxonomyRow {
            id,
            name: self.name.clone(),
            singular: self.singular.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            hierarchical: self.hierarchical,
            post_types: self.post_types.iter().cloned().collect(),
        }
    }
}

/// Category and tag ship with the system and are read-only here.
pub fn builtin() -> Vec<Taxonomy> {
    let post: BTreeSet<String> = ["post".to_string()].into_iter().collect();
    vec![
        Taxonomy {
            id: None,
            name: "Categories".to_string(),
            singular: "Category".to_string(),
            slug: "category".to_string(),
            description: String::new(),
            hierarchical: true,
            post_types: post.clone(),
            builtin: true,
        },
        Taxonomy {
            id: None,
            name: "Tags".to_string(),
            singular: "Tag".to_string(),
            slug: "tag".to_string(),
            description: String::new(),
            hierarchical: false,
            post_types: post,
            builtin: true,
        },
    ]
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxonomyInput {
    pub name: String,
    pub singular: String,
    pub slug: String,
    pub description: String,
    pub hierarchical: bool,
    pub post_types: Vec<String>,
}

impl TaxonomyInput {
    pub fn from_record(record: &Taxonomy) -> Self {
        Self {
            name: record.name.clone(),
            singular: record.singular.clone(),
            slug: record.slug.clone(),
            description: record.description.clone(),
            hierarchical: record.hierarchical,
            post_types: record.post_types.iter().cloned().collect(),
        }
    }

    pub fn from_form(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            singular: form.text("singular"),
            slug: form.text("slug"),
            description: form.text("description"),
            hierarchical: form.flag("hierarchical"),
            post_types: form
                .all("post_types")
                .into_iter()
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Built-ins first, then custom taxonomies by name.
pub fn list(db: &Database) -> Result<Vec<Taxonomy>, ContentError> {
    let mut taxonomies = builtin();
    taxonomies.extend(db.list_taxonomies()?.into_iter().map(Taxonomy::from_row));
    Ok(taxonomies)
}

pub fn get(db: &Database, id: i64) -> Result<Option<Taxonomy>, ContentError> {
    Ok(db.get_taxonomy(id)?.map(Taxonomy::from_row))
}

fn duplicate_slug(slug: &str) -> String {
    format!("A taxonomy with slug '{}' already exists.", slug)
}

/// Name, singular and post type checks shared by create and edit.
fn build_record(
    slug: String,
    input: &TaxonomyInput,
    known_post_types: &BTreeSet<String>,
    errors: &mut ValidationErrors,
    check_slug: impl FnOnce(&str, &mut ValidationErrors),
) -> Taxonomy {
    if input.name.is_empty() {
        errors.push("Name is required.");
    }
    check_slug(&slug, errors);

    let post_types: BTreeSet<String> = input.post_types.iter().cloned().collect();
    if post_types.is_empty() {
        errors.push("Select at least one post type.");
    }
    for post_type in &post_types {
        if !known_post_types.contains(post_type) {
            errors.push(format!("Unknown post type '{}'.", post_type));
        }
    }

    let singular = if input.singular.is_empty() {
        naming::singularize(&input.name)
    } else {
        input.singular.clone()
    };

    Taxonomy {
        id: None,
        name: input.name.clone(),
        singular,
        slug,
        description: input.description.clone(),
        hierarchical: input.hierarchical,
        post_types,
        builtin: false,
    }
}

pub fn create(
    db: &Database,
    reserved: &ReservedSlugs,
    known_post_types: &BTreeSet<String>,
    input: &TaxonomyInput,
    mut errors: ValidationErrors,
) -> Result<Taxonomy, ContentError> {
    let slug = if input.slug.is_empty() {
        naming::slugify(&input.name)
    } else {
        naming::slugify(&input.slug)
    };
    let existing = db.list_taxonomies()?;

    let record = build_record(slug, input, known_post_types, &mut errors, |slug, errors| {
        if slug.is_empty() {
            if !input.name.is_empty() || !input.slug.is_empty() {
                errors.push("Slug must contain letters or digits.");
            }
        } else if slug.chars().count() > MAX_SLUG_CHARS {
            errors.push(format!("Slug must be at most {} characters.", MAX_SLUG_CHARS));
        } else if reserved.is_reserved(slug) {
            errors.push(format!("The slug '{}' is reserved.", slug));
        } else if existing.iter().any(|row| row.slug == slug) {
            errors.push(duplicate_slug(slug));
        }
    });
    let mut record = errors.into_result(record)?;

    let id = db.insert_taxonomy(&record.to_row(0)).map_err(|err| match err {
        DbError::UniqueViolation(_) => {
            ContentError::Validation(ValidationErrors::single(duplicate_slug(&record.slug)))
        }
        other => ContentError::Database(other),
    })?;
    record.id = Some(id);
    Ok(record)
}

/// Edits a custom taxonomy. The slug is immutable, so reserved slugs are
/// not checked here. Post types already attached to the stored record stay
/// valid after they are unregistered, so the taxonomy can still be saved.
pub fn update(
    db: &Database,
    known_post_types: &BTreeSet<String>,
    id: i64,
    input: &TaxonomyInput,
    mut errors: ValidationErrors,
) -> Result<Taxonomy, ContentError> {
    let existing = db
        .get_taxonomy(id)?
        .ok_or_else(|| ContentError::NotFound(format!("Taxonomy {}", id)))?;

    let allowed: BTreeSet<String> = known_post_types
        .iter()
        .chain(existing.post_types.iter())
        .cloned()
        .collect();
    let record = build_record(existing.slug, input, &allowed, &mut errors, |_, _| {});
    let mut record = errors.into_result(record)?;
    if !db.update_taxonomy(&record.to_row(id))? {
        return Err(ContentError::NotFound(format!("Taxonomy {}", id)));
    }
    record.id = Some(id);
    Ok(record)
}

/// Removes a custom taxonomy; `Ok(None)` when there was nothing to remove.
pub fn delete(db: &Database, id: i64) -> Result<Option<Taxonomy>, ContentError> {
    let Some(existing) = get(db, id)? else {
        return Ok(None);
    };
    if !db.delete_taxonomy(id)? {
        return Ok(None);
    }
    Ok(Some(existing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> BTreeSet<String> {
        ["post", "page", "book"].iter().map(|s| s.to_string()).collect()
    }

    fn input(name: &str, post_types: &[&str]) -> TaxonomyInput {
        TaxonomyInput {
            name: name.to_string(),
            post_types: post_types.iter().map(|s| s.to_string()).collect(),
            ..TaxonomyInput::default()
        }
    }

    fn messages(result: Result<Taxonomy, ContentError>) -> Vec<String> {
        match result {
            Err(ContentError::Validation(errors)) => errors.messages().to_vec(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn genres_scenario_infers_slug_and_singular() {
        let db = Database::open_in_memory().unwrap();
        let record = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("Genres", &["post"]),
            ValidationErrors::new(),
        )
        .unwrap();

        assert_eq!(record.slug, "genres");
        assert_eq!(record.singular, "Genre");
        assert!(!record.hierarchical);
        assert!(record.id.is_some());

        let stored = get(&db, record.id.unwrap()).unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn create_rejects_reserved_and_duplicate_slugs() {
        let db = Database::open_in_memory().unwrap();
        let reserved = ReservedSlugs::default();
        let messages_for = |name: &str| {
            messages(create(
                &db,
                &reserved,
                &known(),
                &input(name, &["post"]),
                ValidationErrors::new(),
            ))
        };

        assert_eq!(messages_for("Category"), ["The slug 'category' is reserved."]);
        create(&db, &reserved, &known(), &input("Genres", &["post"]), ValidationErrors::new())
            .unwrap();
        assert_eq!(
            messages_for("Genres"),
            ["A taxonomy with slug 'genres' already exists."]
        );
    }

    #[test]
    fn create_requires_name_and_known_post_types() {
        let db = Database::open_in_memory().unwrap();
        let result = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("", &[]),
            ValidationErrors::new(),
        );
        assert_eq!(
            messages(result),
            ["Name is required.", "Select at least one post type."]
        );

        let result = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("Moods", &["recipe"]),
            ValidationErrors::new(),
        );
        assert_eq!(messages(result), ["Unknown post type 'recipe'."]);
        assert!(db.list_taxonomies().unwrap().is_empty());
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let db = Database::open_in_memory().unwrap();
        let mut request = input("Music Genres", &["post"]);
        request.slug = "  Music  Genre! ".to_string();
        let record = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &request,
            ValidationErrors::new(),
        )
        .unwrap();
        assert_eq!(record.slug, "music-genre");
    }

    #[test]
    fn edit_never_checks_reserved_slugs() {
        let db = Database::open_in_memory().unwrap();
        let legacy = TaxonomyRow {
            id: 0,
            name: "Authors".to_string(),
            singular: "Author".to_string(),
            slug: "author".to_string(),
            description: String::new(),
            hierarchical: false,
            post_types: vec!["post".to_string()],
        };
        let id = db.insert_taxonomy(&legacy).unwrap();

        let mut edit = input("Writers", &["post", "book"]);
        edit.slug = "ignored".to_string();
        edit.hierarchical = true;
        let updated = update(&db, &known(), id, &edit, ValidationErrors::new()).unwrap();

        assert_eq!(updated.slug, "author");
        assert_eq!(updated.singular, "Writer");
        assert!(updated.hierarchical);
    }

    #[test]
    fn edit_keeps_or_drops_unregistered_post_types() {
        let db = Database::open_in_memory().unwrap();
        let record = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("Genres", &["post", "book"]),
            ValidationErrors::new(),
        )
        .unwrap();
        let id = record.id.unwrap();
        let without_book: BTreeSet<String> =
            ["post", "page"].iter().map(|s| s.to_string()).collect();

        let kept = update(
            &db,
            &without_book,
            id,
            &input("Genres", &["post", "book"]),
            ValidationErrors::new(),
        )
        .unwrap();
        assert!(kept.post_types.contains("book"));

        let dropped = update(
            &db,
            &without_book,
            id,
            &input("Genres", &["post"]),
            ValidationErrors::new(),
        )
        .unwrap();
        assert_eq!(dropped.post_types.len(), 1);

        let result = update(
            &db,
            &without_book,
            id,
            &input("Genres", &["post", "book"]),
            ValidationErrors::new(),
        );
        assert_eq!(messages(result), ["Unknown post type 'book'."]);
    }

    #[test]
    fn update_missing_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let result = update(&db, &known(), 42, &input("X", &["post"]), ValidationErrors::new());
        assert!(matches!(result, Err(ContentError::NotFound(_))));
    }

    #[test]
    fn delete_missing_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        let record = create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("Genres", &["post"]),
            ValidationErrors::new(),
        )
        .unwrap();
        let id = record.id.unwrap();

        assert_eq!(delete(&db, id).unwrap().map(|t| t.slug), Some("genres".to_string()));
        assert_eq!(delete(&db, id).unwrap(), None);
    }

    #[test]
    fn list_puts_builtins_first() {
        let db = Database::open_in_memory().unwrap();
        create(
            &db,
            &ReservedSlugs::default(),
            &known(),
            &input("Genres", &["post"]),
            ValidationErrors::new(),
        )
        .unwrap();
        let slugs: Vec<_> = list(&db).unwrap().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, ["category", "tag", "genres"]);
    }
}
