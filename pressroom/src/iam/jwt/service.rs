// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Claims, JwtError};
use crate::config::ValidatedConfig;
use actix_web::cookie::{Cookie, SameSite, time::OffsetDateTime};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// Issues and verifies the HS256 session cookies of the admin area.
pub struct JwtService {
    secret: String,
    issuer: String,
    audience: String,
    expiration_hours: u64,
    cookie_name: String,
    is_localhost: bool,
}

impl JwtService {
    pub fn new(config: &ValidatedConfig) -> Self {
        let auth = &config.auth;
        JwtService {
            secret: auth.secret.clone(),
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            expiration_hours: auth.expiration_hours,
            cookie_name: auth.cookie_name.clone(),
            is_localhost: is_loopback_host(&config.server.host),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Create a session token for an actor. Each call yields a fresh session id.
    pub fn create_token(&self, email: &str, name: &str, roles: &[String]) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours as i64);

        let claims = Claims {
            sub: email.to_string(),
            name: name.to_string(),
            groups: roles.to_vec(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))
    }

    /// Verify a session token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        Ok(token_data.claims)
    }

    /// HTTP-only cookie carrying the session token. `Secure` is dropped on loopback hosts.
    pub fn create_auth_cookie<'a>(&self, token: &str) -> Cookie<'a> {
        let expiration = Utc::now() + Duration::hours(self.expiration_hours as i64);
        let expires = match OffsetDateTime::from_unix_timestamp(expiration.timestamp()) {
            Ok(val) => val,
            Err(e) => {
                log::error!(
                    "Failed to convert expiration timestamp for auth cookie: {}",
                    e
                );
                OffsetDateTime::UNIX_EPOCH
            }
        };

        Cookie::build(self.cookie_name.clone(), token.to_string())
            .path("/")
            .secure(!self.is_localhost)
            .http_only(true)
            .same_site(SameSite::Lax)
            .expires(expires)
            .finish()
    }
}

fn is_loopback_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::TestConfigBuilder;

    fn service() -> JwtService {
        JwtService::new(&TestConfigBuilder::new().build())
    }

    #[test]
    fn token_round_trips_actor_and_roles() {
        let service = service();
        let token = service
            .create_token("editor@example.com", "Editor", &["admin".to_string()])
            .unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "editor@example.com");
        assert_eq!(claims.name, "Editor");
        assert_eq!(claims.groups, vec!["admin".to_string()]);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn every_token_gets_its_own_session_id() {
        let service = service();
        let first = service.create_token("a@example.com", "A", &[]).unwrap();
        let second = service.create_token("a@example.com", "A", &[]).unwrap();
        assert_ne!(
            service.verify_token(&first).unwrap().jti,
            service.verify_token(&second).unwrap().jti
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut config = TestConfigBuilder::new().build();
        config.auth.secret = "another-secret".to_string();
        let foreign = JwtService::new(&config)
            .create_token("a@example.com", "A", &[])
            .unwrap();

        assert!(matches!(
            service().verify_token(&foreign),
            Err(JwtError::TokenVerificationError(_))
        ));
    }

    #[test]
    fn cookie_is_http_only_and_named_from_config() {
        let service = service();
        let cookie = service.create_auth_cookie("token-value");
        assert_eq!(cookie.name(), service.cookie_name());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
