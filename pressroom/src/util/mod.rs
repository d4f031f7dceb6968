// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod color;
pub mod csrf_helper;
pub mod flash;
pub mod form;
pub mod logging;
pub mod test_config;
pub mod test_fixtures;

pub use csrf_helper::{CSRF_FIELD_NAME, CsrfTokenStore};
pub use flash::{FlashKind, FlashMessage, FlashStore};
pub use form::FormData;
pub use logging::{LevelRule, build_logger, default_level_rules, init_logger};
pub use test_config::{TestConfigBuilder, test_config};
