// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod collection;
pub mod custom_css;
pub mod field_groups;
pub mod fields;
pub mod login_theme;
pub mod naming;
pub mod plugins;
pub mod post_types;
pub mod reserved;
pub mod taxonomies;

use crate::db::DbError;
use crate::options::StoreError;
use serde::Serialize;
use std::fmt;

/// Ordered, user-facing validation messages for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// `Ok(value)` when nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, ContentError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ContentError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

#[derive(Debug)]
pub enum ContentError {
    Validation(ValidationErrors),
    NotFound(String),
    /// Referential guard: records of this type still exist.
    InUse { count: u64, label: String, label_plural: String },
    /// Opaque failure reported by plugin activation.
    Plugin(String),
    Store(StoreError),
    Database(DbError),
}

impl ContentError {
    pub fn is_persistence(&self) -> bool {
        matches!(self, ContentError::Store(_) | ContentError::Database(_))
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::Validation(errors) => write!(f, "{}", errors),
            ContentError::NotFound(what) => write!(f, "{} not found", what),
            ContentError::InUse {
                count,
                label,
                label_plural,
            } => {
                let (noun, verb) = if *count == 1 {
                    (label, "exists")
                } else {
                    (label_plural, "exist")
                };
                write!(
                    f,
                    "Cannot delete {}: {} {} still {}.",
                    label_plural, count, noun, verb
                )
            }
            ContentError::Plugin(message) => write!(f, "{}", message),
            ContentError::Store(err) => write!(f, "{}", err),
            ContentError::Database(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ContentError {}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        ContentError::Store(err)
    }
}

impl From<DbError> for ContentError {
    fn from(err: DbError) -> Self {
        ContentError::Database(err)
    }
}

impl From<ValidationErrors> for ContentError {
    fn from(errors: ValidationErrors) -> Self {
        ContentError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_use_message_names_count_and_plural_label() {
        let error = ContentError::InUse {
            count: 3,
            label: "Book".to_string(),
            label_plural: "Books".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot delete Books: 3 Books still exist.");
    }

    #[test]
    fn in_use_message_uses_singular_for_one() {
        let error = ContentError::InUse {
            count: 1,
            label: "Book".to_string(),
            label_plural: "Books".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot delete Books: 1 Book still exists.");
    }

    #[test]
    fn into_result_reports_collected_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result(1).is_ok());
        errors.push("Name is required.");
        match errors.into_result(1) {
            Err(ContentError::Validation(errors)) => {
                assert_eq!(errors.messages(), ["Name is required.".to_string()])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
