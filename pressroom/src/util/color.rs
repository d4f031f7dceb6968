// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Hex color helpers for generated stylesheets.

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` into RGB components.
/// The alpha channel, when present, is ignored.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 | 4 => {
            let digits: Vec<u8> = hex
                .chars()
                .take(3)
                .filter_map(|c| c.to_digit(16).map(|d| d as u8))
                .collect();
            match digits.as_slice() {
                [r, g, b] => Some((r * 17, g * 17, b * 17)),
                _ => None,
            }
        }
        6 | 8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Render `color` with `opacity_percent` (clamped to 0..=100) as a CSS `rgba()`.
/// Unparseable colors fall back to transparent black.
pub fn rgba(color: &str, opacity_percent: i64) -> String {
    let (r, g, b) = parse_hex_color(color).unwrap_or((0, 0, 0));
    let alpha = opacity_percent.clamp(0, 100) as f32 / 100.0;
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}
