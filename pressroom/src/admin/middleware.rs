// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{DevMode, ValidatedConfig};
use crate::iam::jwt::Claims;
use crate::iam::{Actor, AuthRequest};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::LOCATION,
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

/// Session id used for the synthetic actor of a development bypass.
pub const DEV_SESSION_ID: &str = "dev-mode";

/// Middleware that requires a role. Anonymous requests are sent to the login
/// page with a return path; signed-in actors without the role get a 403.
pub struct RequireRole {
    config: Arc<ValidatedConfig>,
    role: String,
}

impl RequireRole {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        let role = config.auth.admin_role.clone();
        Self { config, role }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            config: self.config.clone(),
            role: self.role.clone(),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    config: Arc<ValidatedConfig>,
    role: String,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !req.request().is_authenticated()
            && is_dev_mode_bypass_allowed(req.request(), &self.config)
        {
            log::debug!("🔧 DEV MODE: Bypassing admin authentication");
            insert_dev_actor(&req, &self.role);
        }

        if !req.request().has_role(&self.role) {
            let is_authenticated = req.request().is_authenticated();
            let (req, _) = req.into_parts();

            let response = if is_authenticated {
                log::warn!(
                    "Admin access denied for {} on {}",
                    req.actor().map(|actor| actor.email).unwrap_or_default(),
                    req.path()
                );
                HttpResponse::Forbidden()
                    .content_type("text/plain; charset=utf-8")
                    .body("Forbidden")
            } else {
                let current_path = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or(req.uri().path());
                let location = format!(
                    "{}?return_path={}",
                    self.config.auth.login_path,
                    urlencoding::encode(current_path)
                );
                HttpResponse::Found()
                    .insert_header((LOCATION, location))
                    .finish()
            };

            let response = response.map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Development bypass, honored only in debug builds.
fn is_dev_mode_bypass_allowed(req: &HttpRequest, config: &ValidatedConfig) -> bool {
    if !cfg!(debug_assertions) {
        return false;
    }

    match &config.dev_mode {
        Some(DevMode::Dangerous) => {
            log::warn!("🚨 DEV MODE: Dangerous mode active - bypassing ALL access controls");
            true
        }
        Some(DevMode::Localhost) => req
            .peer_addr()
            .map(|addr| addr.ip().is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

fn insert_dev_actor(req: &ServiceRequest, role: &str) {
    let claims = Claims {
        sub: "dev@localhost".to_string(),
        name: "Developer".to_string(),
        groups: vec![role.to_string()],
        iat: 0,
        exp: 0,
        iss: String::new(),
        aud: String::new(),
        jti: DEV_SESSION_ID.to_string(),
    };
    let actor = Actor::from(&claims);
    let mut extensions = req.extensions_mut();
    extensions.insert(claims);
    extensions.insert(actor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::JwtAuthMiddlewareFactory;
    use crate::iam::jwt::JwtService;
    use crate::util::test_config::TestConfigBuilder;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::web::Data;
    use actix_web::{App, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("inside")
    }

    fn token(jwt: &JwtService, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|role| role.to_string()).collect();
        jwt.create_token("someone@example.com", "Someone", &roles)
            .unwrap()
    }

    macro_rules! admin_app {
        ($config:expr) => {{
            let config = Arc::new($config);
            test::init_service(
                App::new()
                    .app_data(Data::new(JwtService::new(&config)))
                    .wrap(JwtAuthMiddlewareFactory)
                    .service(
                        web::scope("/admin")
                            .wrap(RequireRole::new(config.clone()))
                            .route("/plugins", web::get().to(ok)),
                    ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn anonymous_is_redirected_to_login_with_return_path() {
        let app = admin_app!(TestConfigBuilder::new().build());
        let req = test::TestRequest::get()
            .uri("/admin/plugins?status=active")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert_eq!(
            location,
            "/login?return_path=%2Fadmin%2Fplugins%3Fstatus%3Dactive"
        );
    }

    #[actix_web::test]
    async fn actor_without_role_is_forbidden() {
        let config = TestConfigBuilder::new().build();
        let jwt = JwtService::new(&config);
        let app = admin_app!(config);
        let req = test::TestRequest::get()
            .uri("/admin/plugins")
            .cookie(Cookie::new(jwt.cookie_name().to_string(), token(&jwt, &["editor"])))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn actor_with_configured_role_passes() {
        let config = TestConfigBuilder::new().with_admin_role("manager").build();
        let jwt = JwtService::new(&config);
        let app = admin_app!(config);
        let req = test::TestRequest::get()
            .uri("/admin/plugins")
            .cookie(Cookie::new(jwt.cookie_name().to_string(), token(&jwt, &["manager"])))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn dangerous_dev_mode_bypasses_gate_in_debug_builds() {
        let config = TestConfigBuilder::new()
            .with_dev_mode(Some(DevMode::Dangerous))
            .build();
        let app = admin_app!(config);
        let req = test::TestRequest::get().uri("/admin/plugins").to_request();
        let resp = test::call_service(&app, req).await;
        if cfg!(debug_assertions) {
            assert_eq!(resp.status(), StatusCode::OK);
        } else {
            assert_eq!(resp.status(), StatusCode::FOUND);
        }
    }
}
