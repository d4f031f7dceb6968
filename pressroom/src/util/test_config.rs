// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AdminConfig, AppConfig, AuthConfig, DevMode, LoggingConfig, ServerConfig, ValidatedConfig,
};

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5466,
                    workers: 1,
                },
                admin: AdminConfig {
                    path: "/admin".to_string(),
                },
                app: AppConfig {
                    name: "Test App".to_string(),
                    description: "Test Description".to_string(),
                },
                auth: AuthConfig {
                    secret: "test-secret".to_string(),
                    issuer: "pressroom".to_string(),
                    audience: "pressroom-admins".to_string(),
                    expiration_hours: 12,
                    cookie_name: "pressroom_auth".to_string(),
                    login_path: "/login".to_string(),
                    admin_role: "admin".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                dev_mode: None,
            },
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: Option<DevMode>) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    pub fn with_admin_path(mut self, path: &str) -> Self {
        self.config.admin.path = path.to_string();
        self
    }

    pub fn with_admin_role(mut self, role: &str) -> Self {
        self.config.auth.admin_role = role.to_string();
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
