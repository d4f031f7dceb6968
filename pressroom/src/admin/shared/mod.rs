// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::context::AdminContext;
use crate::content::ContentError;
use crate::content::custom_css::{self, CssTarget};
use crate::headers::{generate_csp_nonce, set_strict_csp};
use crate::templates::{LayoutContext, render_minijinja_template};
use crate::util::{CSRF_FIELD_NAME, FlashKind};
use actix_web::Result;
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, web};
use minijinja::Value;
use std::collections::HashMap;

pub const TOKEN_ERROR: &str = "Your session token is invalid or expired. Please try again.";
pub const SAVE_ERROR: &str = "An internal error occurred while saving. Please try again.";
pub const LOAD_ERROR: &str = "An internal error occurred while loading. Please try again.";

/// What a create or edit form does after the operation was rejected.
pub enum FormFailure {
    Errors(Vec<String>),
    NotFound,
}

/// Maps a failed create/edit onto messages for the redisplayed form.
/// Persistence failures are logged and replaced by a generic message.
pub fn form_failure(operation: &str, err: ContentError) -> FormFailure {
    match err {
        ContentError::Validation(errors) => FormFailure::Errors(errors.messages().to_vec()),
        ContentError::NotFound(what) => {
            log::debug!("Cannot {}: {} not found", operation, what);
            FormFailure::NotFound
        }
        err if err.is_persistence() => {
            log::error!("Failed to {}: {}", operation, err);
            FormFailure::Errors(vec![SAVE_ERROR.to_string()])
        }
        other => FormFailure::Errors(vec![other.to_string()]),
    }
}

/// Logs a failed read and queues the generic message for the page about to render.
pub fn report_load_failure(ctx: &AdminContext, what: &str, error: &dyn std::fmt::Display) {
    log::error!("Failed to load {}: {}", what, error);
    ctx.flash(FlashKind::Error, LOAD_ERROR);
}

pub fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.into()))
        .finish()
}

/// Appends a short-lived status indicator to a list URL.
pub fn with_indicator(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        url,
        separator,
        key,
        urlencoding::encode(value)
    )
}

fn notice_from_query(req: &HttpRequest) -> Option<String> {
    let query = web::Query::<HashMap<String, String>>::from_query(req.query_string()).ok()?;
    let value = |key: &str| query.get(key).map(String::as_str);

    if let Some(slug) = value("created") {
        return Some(format!("'{}' was created.", slug));
    }
    if let Some(slug) = value("updated") {
        return Some(format!("'{}' was updated.", slug));
    }
    match value("deleted") {
        Some("1") => return Some("Deleted.".to_string()),
        Some("0") => return Some("Nothing was deleted; the item no longer exists.".to_string()),
        _ => {}
    }
    if let Some(slug) = value("activated") {
        return Some(format!("Plugin '{}' activated.", slug));
    }
    if let Some(slug) = value("deactivated") {
        return Some(format!("Plugin '{}' deactivated.", slug));
    }
    if value("saved").is_some() {
        return Some("Settings saved.".to_string());
    }
    if value("reset").is_some() {
        return Some("Settings restored to their defaults.".to_string());
    }
    None
}

/// Renders an admin page inside the shared layout with a per-response CSP nonce.
pub fn render_page(
    req: &HttpRequest,
    ctx: &AdminContext,
    template: &str,
    section: &str,
    title: &str,
    page: Value,
) -> Result<HttpResponse> {
    let state = ctx.state();
    let config = ctx.config();
    let csp_nonce = generate_csp_nonce();
    set_strict_csp(req, &csp_nonce);

    let admin_css = custom_css::load(state.options.as_ref(), CssTarget::Admin).unwrap_or_else(|err| {
        log::warn!("Failed to load custom admin CSS: {}", err);
        String::new()
    });

    let layout = LayoutContext::new(
        &config.app.name,
        config.admin.path.trim_end_matches('/'),
        section,
        title,
        ctx.actor.display_name(),
        CSRF_FIELD_NAME,
        &ctx.csrf_token,
        &csp_nonce,
    )
    .with_flashes(ctx.take_flashes())
    .with_notice(notice_from_query(req))
    .with_custom_admin_css(custom_css::style_element_text(&admin_css));

    let html = render_minijinja_template(state.templates.as_ref(), template, layout.to_value(page))
        .map_err(|err| {
            log::error!("Failed to render template {}: {}", template, err);
            actix_web::error::ErrorInternalServerError("Template rendering failed")
        })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
