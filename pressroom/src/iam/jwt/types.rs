// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,         // Subject (actor email)
    pub name: String,        // Display name
    pub groups: Vec<String>, // Roles
    pub iat: i64,            // Issued at
    pub exp: i64,            // Expiration
    pub iss: String,         // Issuer
    pub aud: String,         // Audience
    pub jti: String,         // Session id
}

#[derive(Debug, Clone)]
// Remove once variants are renamed to drop the shared Error suffix.
#[allow(clippy::enum_variant_names)]
pub enum JwtError {
    TokenCreationError(String),
    TokenVerificationError(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenCreationError(msg) => write!(f, "Token creation error: {}", msg),
            JwtError::TokenVerificationError(msg) => write!(f, "Token verification error: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}
