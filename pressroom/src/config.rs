// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DevMode {
    Localhost,
    Dangerous,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub dev_mode: Option<DevMode>,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub dev_mode: Option<DevMode>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ServerConfig {
    pub fn address_tuple(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub expiration_hours: u64,
    #[serde(default = "default_jwt_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

fn default_jwt_issuer() -> String {
    "pressroom".to_string()
}

fn default_jwt_audience() -> String {
    "pressroom-admins".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    12
}

fn default_jwt_cookie_name() -> String {
    "pressroom_auth".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_server(&self.server)?;
        Self::validate_admin(&self.admin)?;
        Self::validate_auth(&self.auth)?;
        Self::validate_logging(&self.logging)?;

        let dev_mode = if let Some(dev_mode) = self.dev_mode.clone() {
            if cfg!(debug_assertions) {
                match dev_mode {
                    DevMode::Dangerous => {
                        warn!(
                            "🚨 WARNING: Development mode set to 'dangerous' - ALL access controls are bypassed!"
                        );
                        warn!("🚨 This should NEVER be used in production!");
                    }
                    DevMode::Localhost => {
                        warn!("🔧 Development mode enabled for localhost connections");
                    }
                }
                Some(dev_mode)
            } else {
                warn!(
                    "🚨 WARNING: dev_mode is configured but ignored in release builds; remove it from config.yaml"
                );
                None
            }
        } else {
            None
        };

        Ok(ValidatedConfig {
            server: self.server,
            admin: self.admin,
            app: self.app,
            auth: self.auth,
            logging: self.logging,
            dev_mode,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Server host must not be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "Server workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_admin(admin: &AdminConfig) -> Result<(), ConfigError> {
        let path = admin.path.as_str();
        if !path.starts_with('/') || path == "/" || path.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "Admin path must start with '/', must not be '/' and must not end with '/', got: {}",
                path
            )));
        }
        Ok(())
    }

    fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
        if auth.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Auth secret must not be empty".to_string(),
            ));
        }
        if auth.expiration_hours == 0 {
            return Err(ConfigError::ValidationError(
                "Auth expiration_hours must be at least 1".to_string(),
            ));
        }
        if auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Auth cookie_name must not be empty".to_string(),
            ));
        }
        if !auth.login_path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "Auth login_path must start with '/', got: {}",
                auth.login_path
            )));
        }
        if auth.admin_role.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Auth admin_role must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Logging level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                logging.level
            )));
        }
        Ok(())
    }
}

impl ValidatedConfig {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn base_auth_config() -> AuthConfig {
        AuthConfig {
            secret: "secret".to_string(),
            issuer: default_jwt_issuer(),
            audience: default_jwt_audience(),
            expiration_hours: 12,
            cookie_name: default_jwt_cookie_name(),
            login_path: default_login_path(),
            admin_role: default_admin_role(),
        }
    }

    #[test]
    fn validate_admin_rejects_root_path() {
        let admin = AdminConfig {
            path: "/".to_string(),
        };
        assert!(Config::validate_admin(&admin).is_err());
    }

    #[test]
    fn validate_admin_rejects_trailing_slash() {
        let admin = AdminConfig {
            path: "/admin/".to_string(),
        };
        assert!(Config::validate_admin(&admin).is_err());
    }

    #[test]
    fn validate_auth_rejects_empty_secret() {
        let mut auth = base_auth_config();
        auth.secret = "  ".to_string();
        assert!(Config::validate_auth(&auth).is_err());
    }

    #[test]
    fn validate_auth_rejects_relative_login_path() {
        let mut auth = base_auth_config();
        auth.login_path = "login".to_string();
        assert!(Config::validate_auth(&auth).is_err());
    }

    #[test]
    fn validate_logging_rejects_unknown_level() {
        let logging = LoggingConfig {
            level: "verbose".to_string(),
        };
        assert!(Config::validate_logging(&logging).is_err());
    }

    #[test]
    fn validate_logging_is_case_insensitive() {
        let logging = LoggingConfig {
            level: "WARN".to_string(),
        };
        assert!(Config::validate_logging(&logging).is_ok());
    }

    #[test]
    fn load_applies_auth_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-defaults").expect("fixture");
        fs::write(
            fixture.path().join("config.yaml"),
            "server:\n  host: 127.0.0.1\n  port: 8080\nadmin:\n  path: /admin\napp:\n  name: Test\nauth:\n  secret: abc\nlogging:\n  level: info\n",
        )
        .expect("write config");

        let config = Config::load_and_validate(fixture.path()).expect("valid config");
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.auth.cookie_name, "pressroom_auth");
        assert_eq!(config.auth.login_path, "/login");
        assert_eq!(config.auth.admin_role, "admin");
        assert!(config.dev_mode.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let fixture = TestFixtureRoot::new_unique("config-missing").expect("fixture");
        match Config::load(fixture.path()) {
            Err(ConfigError::LoadError(message)) => assert!(message.contains("config.yaml")),
            other => panic!("expected load error, got {:?}", other),
        }
    }
}
