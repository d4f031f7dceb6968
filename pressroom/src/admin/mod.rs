// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod appearance;
pub mod context;
mod field_groups;
pub mod handlers;
pub mod middleware;
mod plugins;
mod post_types;
mod shared;
mod taxonomies;

pub use context::AdminContext;
pub use handlers::configure;
pub use middleware::RequireRole;
