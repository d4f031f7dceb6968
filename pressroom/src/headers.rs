// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, HeaderMap, HeaderName, HeaderValue, PRAGMA,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use actix_web::{Error, HttpMessage, HttpRequest};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use futures_util::future::{Ready, ok};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

const STYLESHEET_CACHE_CONTROL: &str = "public, max-age=0, must-revalidate";
const DYNAMIC_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheDirective {
    #[default]
    NoStore,
    /// Cacheable but revalidated on every use; the public stylesheets.
    Revalidate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HeaderOverride {
    #[default]
    Default,
    Override(HeaderValue),
}

#[derive(Clone, Debug, Default)]
pub struct HeaderDirectives {
    pub cache: CacheDirective,
    pub content_security_policy: HeaderOverride,
}

pub fn update_header_directives(req: &HttpRequest, update: impl FnOnce(&mut HeaderDirectives)) {
    let mut extensions = req.extensions_mut();
    if let Some(existing) = extensions.get_mut::<HeaderDirectives>() {
        update(existing);
    } else {
        let mut directives = HeaderDirectives::default();
        update(&mut directives);
        extensions.insert(directives);
    }
}

pub fn set_cache_directive(req: &HttpRequest, directive: CacheDirective) {
    update_header_directives(req, |directives| {
        directives.cache = directive;
    });
}

/// Per-response nonce for inline `<style>` and `<script>` elements.
pub fn generate_csp_nonce() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

pub fn set_strict_csp(req: &HttpRequest, nonce: &str) {
    let policy = format!(
        "default-src 'self'; img-src 'self' data:; style-src 'self' 'nonce-{}'; script-src 'self' 'nonce-{}'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'; form-action 'self';",
        nonce, nonce
    );
    if let Ok(value) = HeaderValue::from_str(&policy) {
        update_header_directives(req, |directives| {
            directives.content_security_policy = HeaderOverride::Override(value);
        });
    } else {
        log::warn!("Failed to build strict CSP header");
    }
}

pub struct Headers {
    config: Arc<ValidatedConfig>,
}

impl Headers {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        Headers { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Headers
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(HeadersMiddleware {
            service: Arc::new(service),
            config: self.config.clone(),
        })
    }
}

pub struct HeadersMiddleware<S> {
    service: Arc<S>,
    config: Arc<ValidatedConfig>,
}

impl<S, B> Service<ServiceRequest> for HeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(
        &self,
        cx: &mut core::task::Context<'_>,
    ) -> core::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        let config = self.config.clone();

        Box::pin(async move {
            let mut res = fut.await?;

            let directives = res
                .request()
                .extensions()
                .get::<HeaderDirectives>()
                .cloned()
                .unwrap_or_default();

            let headers = res.headers_mut();
            headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
            headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
            headers.insert(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            apply_header_override(
                headers,
                CONTENT_SECURITY_POLICY,
                &directives.content_security_policy,
                HeaderValue::from_static(
                    "default-src 'self'; img-src 'self' data:; style-src 'self'; script-src 'self'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'; form-action 'self';",
                ),
            );

            let is_admin_path = res.request().path().starts_with(&config.admin.path);
            if is_admin_path || directives.cache == CacheDirective::NoStore {
                apply_no_cache_headers(res.headers_mut());
            } else {
                res.headers_mut().insert(
                    CACHE_CONTROL,
                    HeaderValue::from_static(STYLESHEET_CACHE_CONTROL),
                );
            }

            Ok(res)
        })
    }
}

fn apply_no_cache_headers(headers: &mut HeaderMap) {
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static(DYNAMIC_CACHE_CONTROL),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
}

fn apply_header_override(
    headers: &mut HeaderMap,
    header_name: HeaderName,
    directive: &HeaderOverride,
    default_value: HeaderValue,
) {
    match directive {
        HeaderOverride::Default => {
            headers.insert(header_name, default_value);
        }
        HeaderOverride::Override(value) => {
            headers.insert(header_name, value.clone());
        }
    }
}
