// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use super::jwt::{Claims, JwtService};
use super::types::Actor;

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn actor(&self) -> Option<Actor>;
    fn jwt_claims(&self) -> Option<Claims>;
    /// Session id used to bind anti-forgery tokens and flash messages.
    fn session_id(&self) -> Option<String>;
    fn has_role(&self, role: &str) -> bool;

    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn actor(&self) -> Option<Actor> {
        self.extensions().get::<Actor>().cloned()
    }

    fn jwt_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn session_id(&self) -> Option<String> {
        self.jwt_claims().map(|claims| claims.jti)
    }

    fn has_role(&self, role: &str) -> bool {
        self.actor().map(|actor| actor.has_role(role)).unwrap_or(false)
    }

    fn is_authenticated(&self) -> bool {
        self.actor().is_some()
    }
}

// JWT Authentication Middleware
pub struct JwtAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let jwt_service = req.app_data::<Data<JwtService>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            if let Some(jwt_service) = jwt_service
                && let Some(cookie) = req.cookie(jwt_service.cookie_name())
            {
                match jwt_service.verify_token(cookie.value()) {
                    Ok(claims) => {
                        let actor = Actor::from(&claims);
                        let mut extensions = req.extensions_mut();
                        extensions.insert(claims);
                        extensions.insert(actor);
                    }
                    Err(e) => {
                        log::debug!("Ignoring invalid session cookie: {}", e);
                    }
                }
            }

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::TestConfigBuilder;
    use actix_web::cookie::Cookie;
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.actor() {
            Some(actor) => HttpResponse::Ok().body(format!(
                "{}|{}|{}",
                actor.email,
                req.has_role("admin"),
                req.session_id().unwrap_or_default()
            )),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn valid_cookie_attaches_actor_and_session() {
        let jwt = JwtService::new(&TestConfigBuilder::new().build());
        let token = jwt
            .create_token("editor@example.com", "Editor", &["admin".to_string()])
            .unwrap();
        let jti = jwt.verify_token(&token).unwrap().jti;
        let cookie_name = jwt.cookie_name().to_string();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(jwt))
                .wrap(JwtAuthMiddlewareFactory)
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(cookie_name, token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, format!("editor@example.com|true|{}", jti).as_bytes());
    }

    #[actix_web::test]
    async fn tampered_cookie_stays_anonymous() {
        let jwt = JwtService::new(&TestConfigBuilder::new().build());
        let cookie_name = jwt.cookie_name().to_string();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(jwt))
                .wrap(JwtAuthMiddlewareFactory)
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(cookie_name, "not-a-token"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous".as_bytes());
    }
}
