// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Custom admin/frontend stylesheets, the login page theme and the live
//! preview frame both editors post into.

use super::context::AdminContext;
use super::shared::{
    FormFailure, SAVE_ERROR, TOKEN_ERROR, form_failure, redirect, render_page, report_load_failure,
    with_indicator,
};
use crate::content::ValidationErrors;
use crate::content::custom_css::{self, CssTarget};
use crate::content::login_theme::{self, LoginTheme};
use crate::headers::{generate_csp_nonce, set_strict_csp};
use crate::templates::{PreviewContext, render_minijinja_template};
use crate::util::{FlashKind, FormData};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use serde_json::Map;

fn render_css_editor(
    req: &HttpRequest,
    ctx: &AdminContext,
    target: CssTarget,
    css: &str,
    errors: Vec<String>,
) -> Result<HttpResponse> {
    render_page(
        req,
        ctx,
        "admin/css_editor.html",
        "appearance",
        target.title(),
        context! {
            target => target.as_str(),
            css => css,
            errors => errors,
            action => ctx.url(&format!("/appearance/css/{}", target.as_str())),
            preview_url => ctx.url(&format!("/appearance/preview/{}", target.as_str())),
        },
    )
}

pub async fn css_editor(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let Some(target) = CssTarget::parse(&path) else {
        return Ok(redirect(ctx.url("/appearance/css/admin")));
    };
    let css = custom_css::load(ctx.state().options.as_ref(), target).unwrap_or_else(|err| {
        report_load_failure(&ctx, target.title(), &err);
        String::new()
    });
    render_css_editor(&req, &ctx, target, &css, Vec::new())
}

pub async fn css_save(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let Some(target) = CssTarget::parse(&path) else {
        return Ok(redirect(ctx.url("/appearance/css/admin")));
    };
    let form = FormData::from(form.into_inner());
    let css = form.raw("css");
    if !ctx.verify_csrf(&form) {
        return render_css_editor(&req, &ctx, target, &css, vec![TOKEN_ERROR.to_string()]);
    }

    match custom_css::save(ctx.state().options.as_ref(), target, &css) {
        Ok(()) => {
            log::info!("{} saved by {}", target.title(), ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url(&format!("/appearance/css/{}", target.as_str())),
                "saved",
                "1",
            )))
        }
        Err(err) => {
            log::error!("Failed to save {}: {}", target.title(), err);
            render_css_editor(&req, &ctx, target, &css, vec![SAVE_ERROR.to_string()])
        }
    }
}

fn render_login_editor(
    req: &HttpRequest,
    ctx: &AdminContext,
    values: &Map<String, serde_json::Value>,
    errors: Vec<String>,
) -> Result<HttpResponse> {
    render_page(
        req,
        ctx,
        "admin/login_editor.html",
        "appearance",
        "Login Page",
        context! {
            sections => Value::from_serialize(login_theme::editor_sections(values)),
            errors => errors,
            action => ctx.url("/appearance/login"),
            reset_action => ctx.url("/appearance/login/reset"),
            preview_url => ctx.url("/appearance/preview/login"),
        },
    )
}

pub async fn login_editor(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let theme = login_theme::load(ctx.state().options.as_ref()).unwrap_or_else(|err| {
        report_load_failure(&ctx, "login settings", &err);
        LoginTheme::default()
    });
    render_login_editor(&req, &ctx, theme.values(), Vec::new())
}

pub async fn login_save(
    req: HttpRequest,
    ctx: AdminContext,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let form = FormData::from(form.into_inner());
    let mut errors = ValidationErrors::new();
    if !ctx.verify_csrf(&form) {
        errors.push(TOKEN_ERROR);
    }
    let values = login_theme::values_from_form(&form, &mut errors);

    match login_theme::save(ctx.state().options.as_ref(), values.clone(), errors) {
        Ok(_) => {
            log::info!("Login page settings saved by {}", ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/appearance/login"),
                "saved",
                "1",
            )))
        }
        Err(err) => match form_failure("save login settings", err) {
            FormFailure::Errors(messages) => render_login_editor(&req, &ctx, &values, messages),
            FormFailure::NotFound => Ok(redirect(ctx.url("/appearance/login"))),
        },
    }
}

pub async fn login_reset(ctx: AdminContext, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    let form = FormData::from(form.into_inner());
    let editor_url = ctx.url("/appearance/login");
    if !ctx.verify_csrf(&form) {
        ctx.flash(FlashKind::Error, TOKEN_ERROR);
        return redirect(with_indicator(&editor_url, "error", "token"));
    }

    match login_theme::reset(ctx.state().options.as_ref()) {
        Ok(()) => {
            log::info!("Login page settings reset by {}", ctx.actor.email);
            redirect(with_indicator(&editor_url, "reset", "1"))
        }
        Err(err) => {
            log::error!("Failed to reset login settings: {}", err);
            ctx.flash(FlashKind::Error, SAVE_ERROR);
            redirect(with_indicator(&editor_url, "error", "save"))
        }
    }
}

/// Document shown inside the editor's preview frame. It listens for
/// `{type: "updateCSS", css}` messages and swaps the live stylesheet text.
pub async fn preview(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let options = ctx.state().options.as_ref();
    let (target, title, base_css, css) = match path.as_str() {
        "login" => {
            let theme = login_theme::load(options).unwrap_or_else(|err| {
                log::error!("Failed to load login settings for preview: {}", err);
                LoginTheme::default()
            });
            (
                "login",
                "Login Preview",
                theme.generated_css(),
                theme.text("custom_css"),
            )
        }
        other => {
            let Some(target) = CssTarget::parse(other) else {
                return Ok(HttpResponse::NotFound().finish());
            };
            let css = custom_css::load(options, target).unwrap_or_else(|err| {
                log::error!("Failed to load {} for preview: {}", target.title(), err);
                String::new()
            });
            (target.as_str(), target.title(), String::new(), css)
        }
    };

    let csp_nonce = generate_csp_nonce();
    set_strict_csp(&req, &csp_nonce);
    let context = PreviewContext::new(
        target,
        title,
        custom_css::style_element_text(&base_css),
        custom_css::style_element_text(&css),
        &csp_nonce,
    );
    let html = render_minijinja_template(
        ctx.state().templates.as_ref(),
        "admin/preview.html",
        context.to_value(),
    )
    .map_err(|err| {
        log::error!("Failed to render preview: {}", err);
        actix_web::error::ErrorInternalServerError("Template rendering failed")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
