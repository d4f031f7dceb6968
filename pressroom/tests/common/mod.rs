// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::{App, web};
use pressroom::admin;
use pressroom::app_state::AppState;
use pressroom::assets;
use pressroom::config::ValidatedConfig;
use pressroom::headers;
use pressroom::iam::JwtAuthMiddlewareFactory;
use pressroom::iam::jwt::JwtService;
use pressroom::runtime_paths::RuntimePaths;
use pressroom::util::CSRF_FIELD_NAME;
use pressroom::util::TestConfigBuilder;
use pressroom::util::test_fixtures::TestFixtureRoot;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_NAME: &str = "Admin User";

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
    pub jwt_service: Arc<JwtService>,
}

pub struct AuthSession {
    pub jwt_token: String,
    pub jwt_id: String,
    pub cookie: actix_web::cookie::Cookie<'static>,
    pub csrf_token: String,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub jwt_service: Arc<JwtService>,
    pub admin_path: String,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(TestConfigBuilder::new().build())
    }

    pub fn with_config(config: ValidatedConfig) -> Self {
        let fixture = TestFixtureRoot::new_unique("admin-test-suite").expect("fixture root");
        fixture.init_runtime_layout().expect("fixture layout");
        fixture
            .write_plugin(
                "hello-dolly",
                "name: Hello Dolly\nversion: 1.7.2\nauthor: Matt\ndescription: Lyrics in the admin.\n",
            )
            .expect("hello-dolly plugin");
        fixture
            .write_plugin("akismet", "name: Akismet\nversion: 5.3\n")
            .expect("akismet plugin");

        let config = Arc::new(config);
        let runtime_paths = fixture.runtime_paths().expect("runtime paths");
        let app_state = Arc::new(
            AppState::open(&config, runtime_paths.clone()).expect("app state"),
        );
        let jwt_service = Arc::new(JwtService::new(&config));

        Self {
            fixture,
            config,
            runtime_paths,
            app_state,
            jwt_service,
        }
    }

    pub fn session_with_roles(&self, roles: &[&str]) -> AuthSession {
        let roles: Vec<String> = roles.iter().map(|role| role.to_string()).collect();
        let token = self
            .jwt_service
            .create_token(ADMIN_EMAIL, ADMIN_NAME, &roles)
            .expect("jwt token");
        let claims = self.jwt_service.verify_token(&token).expect("jwt claims");
        let cookie = self.jwt_service.create_auth_cookie(&token).into_owned();
        let csrf_token = self.app_state.csrf.get_or_refresh_token(&claims.jti);
        AuthSession {
            jwt_token: token,
            jwt_id: claims.jti,
            cookie,
            csrf_token,
        }
    }

    pub fn admin_auth(&self) -> AuthSession {
        self.session_with_roles(&["admin"])
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            jwt_service: self.jwt_service.clone(),
            admin_path: self.config.admin.path.clone(),
        }
    }

    /// Inserts `count` posts of the given type into the content database.
    pub fn seed_posts(&self, post_type: &str, count: usize) {
        for index in 0..count {
            self.app_state
                .database
                .insert_post(post_type, &format!("{} {}", post_type, index))
                .expect("insert post");
        }
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let admin_path = bundle.admin_path;
    let config_for_security = bundle.config.clone();
    let config_for_admin = bundle.config.clone();

    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.jwt_service))
        .wrap(headers::Headers::new(config_for_security))
        .wrap(JwtAuthMiddlewareFactory)
        .configure(move |cfg| admin::configure(cfg, &admin_path, &config_for_admin))
        .configure(assets::configure)
}

pub fn with_session(
    req: actix_web::test::TestRequest,
    session: &AuthSession,
) -> actix_web::test::TestRequest {
    req.cookie(session.cookie.clone())
}

/// Form body for a mutating admin request, anti-forgery token first.
pub fn form_with_csrf(session: &AuthSession, fields: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut pairs = vec![(CSRF_FIELD_NAME.to_string(), session.csrf_token.clone())];
    pairs.extend(
        fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );
    pairs
}

pub fn form_without_csrf(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn location(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn body_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
