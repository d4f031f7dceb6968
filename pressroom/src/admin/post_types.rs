// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::context::AdminContext;
use super::shared::{
    FormFailure, SAVE_ERROR, TOKEN_ERROR, form_failure, redirect, render_page, report_load_failure,
    with_indicator,
};
use crate::content::fields::FIELD_TYPES;
use crate::content::post_types::{self, ICONS, MAX_SLUG_CHARS, PostTypeInput};
use crate::content::{ContentError, ValidationErrors};
use crate::util::{FlashKind, FormData};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};

fn render_form(
    req: &HttpRequest,
    ctx: &AdminContext,
    editing: Option<&str>,
    input: &PostTypeInput,
    errors: Vec<String>,
) -> Result<HttpResponse> {
    let (title, action) = match editing {
        Some(slug) => (
            "Edit Post Type",
            ctx.url(&format!("/post-types/edit/{}", urlencoding::encode(slug))),
        ),
        None => ("Add Post Type", ctx.url("/post-types/new")),
    };
    render_page(
        req,
        ctx,
        "admin/post_type_form.html",
        "post-types",
        title,
        context! {
            editing => editing,
            action => action,
            input => Value::from_serialize(input),
            errors => errors,
            icons => ICONS,
            field_types => FIELD_TYPES,
            max_slug_chars => MAX_SLUG_CHARS,
        },
    )
}

pub async fn list(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let state = ctx.state();
    let summaries = post_types::list_with_counts(state.options.as_ref(), state.database.as_ref())
        .unwrap_or_else(|err| {
            report_load_failure(&ctx, "post types", &err);
            Vec::new()
        });

    render_page(
        &req,
        &ctx,
        "admin/post_types.html",
        "post-types",
        "Post Types",
        context! {
            post_types => Value::from_serialize(&summaries),
        },
    )
}

pub async fn new_form(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    render_form(&req, &ctx, None, &PostTypeInput::default(), Vec::new())
}

pub async fn create(
    req: HttpRequest,
    ctx: AdminContext,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let form = FormData::from(form.into_inner());
    let mut errors = ValidationErrors::new();
    if !ctx.verify_csrf(&form) {
        errors.push(TOKEN_ERROR);
    }
    let input = PostTypeInput::from_form(&form, &mut errors);

    let state = ctx.state();
    match post_types::create(state.options.as_ref(), &state.reserved, &input, errors) {
        Ok(record) => {
            log::info!("Post type created: {} by {}", record.slug, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/post-types"),
                "created",
                &record.slug,
            )))
        }
        Err(err) => match form_failure("create post type", err) {
            FormFailure::Errors(messages) => render_form(&req, &ctx, None, &input, messages),
            FormFailure::NotFound => Ok(redirect(ctx.url("/post-types"))),
        },
    }
}

pub async fn edit_form(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let state = ctx.state();
    let record = match post_types::load(state.options.as_ref()) {
        Ok(collection) => collection.get(&slug).cloned(),
        Err(err) => {
            report_load_failure(&ctx, "post types", &err);
            None
        }
    };
    let Some(record) = record else {
        return Ok(redirect(ctx.url("/post-types")));
    };
    render_form(
        &req,
        &ctx,
        Some(&slug),
        &PostTypeInput::from_record(&record),
        Vec::new(),
    )
}

pub async fn update(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let form = FormData::from(form.into_inner());
    let mut errors = ValidationErrors::new();
    if !ctx.verify_csrf(&form) {
        errors.push(TOKEN_ERROR);
    }
    let mut input = PostTypeInput::from_form(&form, &mut errors);
    input.slug = slug.clone();

    match post_types::update(ctx.state().options.as_ref(), &slug, &input, errors) {
        Ok(record) => {
            log::info!("Post type updated: {} by {}", record.slug, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/post-types"),
                "updated",
                &record.slug,
            )))
        }
        Err(err) => match form_failure("update post type", err) {
            FormFailure::Errors(messages) => render_form(&req, &ctx, Some(&slug), &input, messages),
            FormFailure::NotFound => Ok(redirect(ctx.url("/post-types"))),
        },
    }
}

pub async fn delete(ctx: AdminContext, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    let form = FormData::from(form.into_inner());
    let list_url = ctx.url("/post-types");
    if !ctx.verify_csrf(&form) {
        ctx.flash(FlashKind::Error, TOKEN_ERROR);
        return redirect(with_indicator(&list_url, "error", "token"));
    }

    let slug = form.text("slug");
    let state = ctx.state();
    match post_types::delete(state.options.as_ref(), state.database.as_ref(), &slug) {
        Ok(record) => {
            log::info!("Post type deleted: {} by {}", record.slug, ctx.actor.email);
            redirect(with_indicator(&list_url, "deleted", "1"))
        }
        Err(ContentError::NotFound(_)) => redirect(with_indicator(&list_url, "deleted", "0")),
        Err(err @ ContentError::InUse { .. }) => {
            ctx.flash(FlashKind::Error, err.to_string());
            redirect(with_indicator(&list_url, "error", "in_use"))
        }
        Err(err) => {
            log::error!("Failed to delete post type '{}': {}", slug, err);
            ctx.flash(FlashKind::Error, SAVE_ERROR);
            redirect(with_indicator(&list_url, "error", "save"))
        }
    }
}
