// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{Database, DbError};
use rusqlite::{OptionalExtension, Row, params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyRow {
    pub id: i64,
    pub name: String,
    pub singular: String,
    pub slug: String,
    pub description: String,
    pub hierarchical: bool,
    pub post_types: Vec<String>,
}

const COLUMNS: &str = "id, name, singular, slug, description, hierarchical, post_types";

fn from_row(row: &Row<'_>) -> Result<TaxonomyRow, rusqlite::Error> {
    let post_types: String = row.get(6)?;
    Ok(TaxonomyRow {
        id: row.get(0)?,
        name: row.get(1)?,
        singular: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        hierarchical: row.get::<_, i64>(5)? != 0,
        post_types: split_post_types(&post_types),
    })
}

fn split_post_types(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect()
}

impl Database {
    pub fn list_taxonomies(&self) -> Result<Vec<TaxonomyRow>, DbError> {
        self.with_conn(|conn| {
            let mut statement = conn.prepare(&format!(
                "SELECT {} FROM taxonomies ORDER BY name COLLATE NOCASE, id",
                COLUMNS
            ))?;
            let rows = statement.query_map([], from_row)?;
            rows.collect()
        })
    }

    pub fn get_taxonomy(&self, id: i64) -> Result<Option<TaxonomyRow>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM taxonomies WHERE id = ?1", COLUMNS),
                params![id],
                from_row,
            )
            .optional()
        })
    }

    /// Inserts a row and returns its id. `row.id` is ignored. A taken slug
    /// surfaces as [`DbError::UniqueViolation`].
    pub fn insert_taxonomy(&self, row: &TaxonomyRow) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO taxonomies (name, singular, slug, description, hierarchical, post_types)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.name,
                    row.singular,
                    row.slug,
                    row.description,
                    row.hierarchical as i64,
                    row.post_types.join(","),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Rewrites the mutable columns. The slug column is never touched.
    pub fn update_taxonomy(&self, row: &TaxonomyRow) -> Result<bool, DbError> {
        let changed = self.with_conn(|conn| {
            conn.execute(
                "UPDATE taxonomies
                 SET name = ?1, singular = ?2, description = ?3, hierarchical = ?4, post_types = ?5
                 WHERE id = ?6",
                params![
                    row.name,
                    row.singular,
                    row.description,
                    row.hierarchical as i64,
                    row.post_types.join(","),
                    row.id,
                ],
            )
        })?;
        Ok(changed > 0)
    }

    pub fn delete_taxonomy(&self, id: i64) -> Result<bool, DbError> {
        let changed = self.with_conn(|conn| {
            conn.execute("DELETE FROM taxonomies WHERE id = ?1", params![id])
        })?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, slug: &str) -> TaxonomyRow {
        TaxonomyRow {
            id: 0,
            name: name.to_string(),
            singular: name.trim_end_matches('s').to_string(),
            slug: slug.to_string(),
            description: String::new(),
            hierarchical: false,
            post_types: vec!["post".to_string(), "book".to_string()],
        }
    }

    #[test]
    fn insert_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_taxonomy(&row("Genres", "genres")).unwrap();
        let stored = db.get_taxonomy(id).unwrap().expect("row");
        assert_eq!(stored.id, id);
        assert_eq!(stored.post_types, vec!["post", "book"]);
        assert_eq!(db.get_taxonomy(id + 1).unwrap(), None);
    }

    #[test]
    fn duplicate_slug_is_a_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        db.insert_taxonomy(&row("Genres", "genres")).unwrap();
        let err = db.insert_taxonomy(&row("Other", "genres")).unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)), "{:?}", err);
    }

    #[test]
    fn update_leaves_slug_alone() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_taxonomy(&row("Genres", "genres")).unwrap();
        let mut changed = row("Styles", "styles");
        changed.id = id;
        changed.hierarchical = true;
        assert!(db.update_taxonomy(&changed).unwrap());

        let stored = db.get_taxonomy(id).unwrap().unwrap();
        assert_eq!(stored.name, "Styles");
        assert_eq!(stored.slug, "genres");
        assert!(stored.hierarchical);
    }

    #[test]
    fn delete_reports_whether_a_row_went_away() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_taxonomy(&row("Genres", "genres")).unwrap();
        assert!(db.delete_taxonomy(id).unwrap());
        assert!(!db.delete_taxonomy(id).unwrap());
        assert!(db.list_taxonomies().unwrap().is_empty());
    }
}
