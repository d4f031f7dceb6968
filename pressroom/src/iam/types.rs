// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::jwt::Claims;
use serde::Serialize;

/// The signed-in person behind an admin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|candidate| candidate == role)
    }

    /// Display name, falling back to the email when the token carries none.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Actor {
            email: claims.sub.clone(),
            name: claims.name.clone(),
            roles: claims.groups.clone(),
        }
    }
}
