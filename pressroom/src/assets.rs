// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Public stylesheets derived from stored options. No authentication.

use crate::app_state::AppState;
use crate::content::custom_css::{self, CssTarget};
use crate::content::login_theme;
use crate::headers::{CacheDirective, set_cache_directive};
use actix_web::{HttpRequest, HttpResponse, Result, web};

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login/theme.css", web::get().to(serve_login_theme));
    cfg.route("/assets/custom.css", web::get().to(serve_frontend_css));
}

async fn serve_login_theme(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let theme = login_theme::load(state.options.as_ref()).map_err(|err| {
        log::error!("Failed to load login theme: {}", err);
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    Ok(css_response(&req, theme.to_css()))
}

async fn serve_frontend_css(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let css = custom_css::load(state.options.as_ref(), CssTarget::Frontend).map_err(|err| {
        log::error!("Failed to load custom frontend CSS: {}", err);
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    Ok(css_response(&req, css))
}

fn css_response(req: &HttpRequest, css: String) -> HttpResponse {
    set_cache_directive(req, CacheDirective::Revalidate);
    HttpResponse::Ok().content_type(CSS_CONTENT_TYPE).body(css)
}
