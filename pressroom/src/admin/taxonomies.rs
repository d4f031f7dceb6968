// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::context::AdminContext;
use super::shared::{
    FormFailure, SAVE_ERROR, TOKEN_ERROR, form_failure, redirect, render_page, report_load_failure,
    with_indicator,
};
use crate::content::post_types::{self, ContentTypeOption};
use crate::content::taxonomies::{self, MAX_SLUG_CHARS, TaxonomyInput};
use crate::content::ValidationErrors;
use crate::options::StoreError;
use crate::util::{FlashKind, FormData};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use std::collections::BTreeSet;

fn content_type_options(ctx: &AdminContext) -> Result<Vec<ContentTypeOption>, StoreError> {
    post_types::content_types(ctx.state().options.as_ref())
}

fn known_slugs(options: &[ContentTypeOption]) -> BTreeSet<String> {
    options.iter().map(|option| option.slug.clone()).collect()
}

/// Registered content types plus any selected slug that is no longer
/// registered, so the form can show it and let it be unticked.
fn form_options(content_types: &[ContentTypeOption], input: &TaxonomyInput) -> Vec<ContentTypeOption> {
    let known = known_slugs(content_types);
    let mut options = content_types.to_vec();
    options.extend(
        input
            .post_types
            .iter()
            .filter(|slug| !known.contains(*slug))
            .map(|slug| ContentTypeOption {
                slug: slug.clone(),
                label: format!("{} (no longer registered)", slug),
            }),
    );
    options
}

fn render_form(
    req: &HttpRequest,
    ctx: &AdminContext,
    editing: Option<i64>,
    input: &TaxonomyInput,
    content_types: &[ContentTypeOption],
    errors: Vec<String>,
) -> Result<HttpResponse> {
    let (title, action) = match editing {
        Some(id) => ("Edit Taxonomy", ctx.url(&format!("/taxonomies/edit/{}", id))),
        None => ("Add Taxonomy", ctx.url("/taxonomies/new")),
    };
    render_page(
        req,
        ctx,
        "admin/taxonomy_form.html",
        "taxonomies",
        title,
        context! {
            editing => editing,
            action => action,
            input => Value::from_serialize(input),
            content_types => Value::from_serialize(form_options(content_types, input)),
            errors => errors,
            max_slug_chars => MAX_SLUG_CHARS,
        },
    )
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok().filter(|id: &i64| *id > 0)
}

pub async fn list(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let taxonomies = taxonomies::list(&ctx.state().database).unwrap_or_else(|err| {
        report_load_failure(&ctx, "taxonomies", &err);
        taxonomies::builtin()
    });

    render_page(
        &req,
        &ctx,
        "admin/taxonomies.html",
        "taxonomies",
        "Taxonomies",
        context! {
            taxonomies => Value::from_serialize(&taxonomies),
        },
    )
}

pub async fn new_form(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let content_types = content_type_options(&ctx).unwrap_or_else(|err| {
        report_load_failure(&ctx, "content types", &err);
        Vec::new()
    });
    render_form(
        &req,
        &ctx,
        None,
        &TaxonomyInput::default(),
        &content_types,
        Vec::new(),
    )
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
    let input = TaxonomyInput::from_form(&form);

    let content_types = match content_type_options(&ctx) {
        Ok(options) => options,
        Err(err) => {
            log::error!("Failed to load content types: {}", err);
            return render_form(&req, &ctx, None, &input, &[], vec![SAVE_ERROR.to_string()]);
        }
    };

    let state = ctx.state();
    match taxonomies::create(
        &state.database,
        &state.reserved,
        &known_slugs(&content_types),
        &input,
        errors,
    ) {
        Ok(record) => {
            log::info!("Taxonomy created: {} by {}", record.slug, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/taxonomies"),
                "created",
                &record.slug,
            )))
        }
        Err(err) => match form_failure("create taxonomy", err) {
            FormFailure::Errors(messages) => {
                render_form(&req, &ctx, None, &input, &content_types, messages)
            }
            FormFailure::NotFound => Ok(redirect(ctx.url("/taxonomies"))),
        },
    }
}

pub async fn edit_form(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Ok(redirect(ctx.url("/taxonomies")));
    };
    let record = taxonomies::get(&ctx.state().database, id).unwrap_or_else(|err| {
        report_load_failure(&ctx, "taxonomy", &err);
        None
    });
    let Some(record) = record else {
        return Ok(redirect(ctx.url("/taxonomies")));
    };
    let content_types = content_type_options(&ctx).unwrap_or_else(|err| {
        report_load_failure(&ctx, "content types", &err);
        Vec::new()
    });
    render_form(
        &req,
        &ctx,
        Some(id),
        &TaxonomyInput::from_record(&record),
        &content_types,
        Vec::new(),
    )
}

pub async fn update(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Ok(redirect(ctx.url("/taxonomies")));
    };
    let form = FormData::from(form.into_inner());
    let mut errors = ValidationErrors::new();
    if !ctx.verify_csrf(&form) {
        errors.push(TOKEN_ERROR);
    }
    let mut input = TaxonomyInput::from_form(&form);

    let content_types = match content_type_options(&ctx) {
        Ok(options) => options,
        Err(err) => {
            log::error!("Failed to load content types: {}", err);
            return render_form(&req, &ctx, Some(id), &input, &[], vec![SAVE_ERROR.to_string()]);
        }
    };

    // The slug is fixed after creation; show the stored one on redisplay.
    if let Ok(Some(existing)) = taxonomies::get(&ctx.state().database, id) {
        input.slug = existing.slug;
    }

    match taxonomies::update(
        &ctx.state().database,
        &known_slugs(&content_types),
        id,
        &input,
        errors,
    ) {
        Ok(record) => {
            log::info!("Taxonomy updated: {} by {}", record.slug, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/taxonomies"),
                "updated",
                &record.slug,
            )))
        }
        Err(err) => match form_failure("update taxonomy", err) {
            FormFailure::Errors(messages) => {
                render_form(&req, &ctx, Some(id), &input, &content_types, messages)
            }
            FormFailure::NotFound => Ok(redirect(ctx.url("/taxonomies"))),
        },
    }
}

pub async fn delete(ctx: AdminContext, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    let form = FormData::from(form.into_inner());
    let list_url = ctx.url("/taxonomies");
    if !ctx.verify_csrf(&form) {
        ctx.flash(FlashKind::Error, TOKEN_ERROR);
        return redirect(with_indicator(&list_url, "error", "token"));
    }

    let Some(id) = parse_id(&form.text("id")) else {
        return redirect(with_indicator(&list_url, "deleted", "0"));
    };
    match taxonomies::delete(&ctx.state().database, id) {
        Ok(Some(record)) => {
            log::info!("Taxonomy deleted: {} by {}", record.slug, ctx.actor.email);
            redirect(with_indicator(&list_url, "deleted", "1"))
        }
        Ok(None) => redirect(with_indicator(&list_url, "deleted", "0")),
        Err(err) => {
            log::error!("Failed to delete taxonomy {}: {}", id, err);
            ctx.flash(FlashKind::Error, SAVE_ERROR);
            redirect(with_indicator(&list_url, "error", "save"))
        }
    }
}
