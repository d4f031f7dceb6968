// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Lower-case `input` and collapse every run of non-alphanumeric characters
/// into a single `separator`, trimming separators from both ends.
pub fn slugify_with(input: &str, separator: char) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(separator);
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

pub fn slugify(input: &str) -> String {
    slugify_with(input, '-')
}

/// Field machine names use `_` so they stay valid template identifiers.
pub fn field_name(input: &str) -> String {
    slugify_with(input, '_')
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value
            .get(value.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

fn match_case(reference: &str, replacement: &str) -> String {
    if reference.chars().any(|c| c.is_uppercase()) && !reference.chars().any(|c| c.is_lowercase())
    {
        replacement.to_ascii_uppercase()
    } else {
        replacement.to_string()
    }
}

const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

/// Best-effort English singular: `ies` -> `y`, sibilant `es` dropped,
/// otherwise a trailing `s` (but not `ss`) dropped.
pub fn singularize(plural: &str) -> String {
    let plural = plural.trim();
    if plural.len() > 3 && ends_with_ignore_case(plural, "ies") {
        let stem = &plural[..plural.len() - 3];
        let tail = &plural[plural.len() - 3..];
        return format!("{}{}", stem, match_case(tail, "y"));
    }
    if plural.len() > 2 && ends_with_ignore_case(plural, "es") {
        let stem = &plural[..plural.len() - 2];
        if SIBILANT_ENDINGS
            .iter()
            .any(|ending| ends_with_ignore_case(stem, ending))
        {
            return stem.to_string();
        }
    }
    if plural.len() > 1 && ends_with_ignore_case(plural, "s") && !ends_with_ignore_case(plural, "ss")
    {
        return plural[..plural.len() - 1].to_string();
    }
    plural.to_string()
}

/// Inverse of [`singularize`] for labels entered in the singular.
pub fn pluralize(singular: &str) -> String {
    let singular = singular.trim();
    if singular.is_empty() {
        return String::new();
    }
    let lower = singular.to_ascii_lowercase();
    if lower.ends_with('y')
        && lower.len() > 1
        && !matches!(lower.as_bytes()[lower.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
    {
        let tail = &singular[singular.len() - 1..];
        return format!(
            "{}{}",
            &singular[..singular.len() - 1],
            match_case(tail, "ies")
        );
    }
    let tail: String = singular.chars().last().map(String::from).unwrap_or_default();
    if SIBILANT_ENDINGS.iter().any(|ending| lower.ends_with(ending)) {
        return format!("{}{}", singular, match_case(&tail, "es"));
    }
    format!("{}{}", singular, match_case(&tail, "s"))
}
