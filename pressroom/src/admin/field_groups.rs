// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::context::AdminContext;
use super::shared::{
    FormFailure, SAVE_ERROR, TOKEN_ERROR, form_failure, redirect, render_page, report_load_failure,
    with_indicator,
};
use crate::content::ValidationErrors;
use crate::content::field_groups::{self, FieldGroupInput};
use crate::content::fields::FIELD_TYPES;
use crate::content::post_types::ContentTypeOption;
use crate::util::{FlashKind, FormData};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use std::collections::BTreeSet;

fn render_form(
    req: &HttpRequest,
    ctx: &AdminContext,
    editing: Option<&str>,
    input: &FieldGroupInput,
    locations: &[ContentTypeOption],
    errors: Vec<String>,
) -> Result<HttpResponse> {
    let (title, action) = match editing {
        Some(id) => (
            "Edit Field Group",
            ctx.url(&format!("/field-groups/edit/{}", urlencoding::encode(id))),
        ),
        None => ("Add Field Group", ctx.url("/field-groups/new")),
    };
    render_page(
        req,
        ctx,
        "admin/field_group_form.html",
        "field-groups",
        title,
        context! {
            editing => editing,
            action => action,
            input => Value::from_serialize(input),
            locations => Value::from_serialize(locations),
            field_types => FIELD_TYPES,
            errors => errors,
        },
    )
}

fn location_options(ctx: &AdminContext) -> Vec<ContentTypeOption> {
    field_groups::location_options(ctx.state().options.as_ref()).unwrap_or_else(|err| {
        report_load_failure(ctx, "field group locations", &err);
        Vec::new()
    })
}

fn known(locations: &[ContentTypeOption]) -> BTreeSet<String> {
    locations.iter().map(|option| option.slug.clone()).collect()
}

pub async fn list(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let groups: Vec<_> = match field_groups::load(ctx.state().options.as_ref()) {
        Ok(collection) => collection.values().cloned().collect(),
        Err(err) => {
            report_load_failure(&ctx, "field groups", &err);
            Vec::new()
        }
    };

    render_page(
        &req,
        &ctx,
        "admin/field_groups.html",
        "field-groups",
        "Field Groups",
        context! {
            field_groups => Value::from_serialize(&groups),
        },
    )
}

pub async fn new_form(req: HttpRequest, ctx: AdminContext) -> Result<HttpResponse> {
    let locations = location_options(&ctx);
    render_form(
        &req,
        &ctx,
        None,
        &FieldGroupInput::default(),
        &locations,
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
    let input = FieldGroupInput::from_form(&form, &mut errors);
    let locations = match field_groups::location_options(ctx.state().options.as_ref()) {
        Ok(locations) => locations,
        Err(err) => {
            log::error!("Failed to load field group locations: {}", err);
            return render_form(&req, &ctx, None, &input, &[], vec![SAVE_ERROR.to_string()]);
        }
    };

    match field_groups::create(ctx.state().options.as_ref(), &known(&locations), &input, errors) {
        Ok(record) => {
            log::info!("Field group created: {} by {}", record.id, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/field-groups"),
                "created",
                &record.id,
            )))
        }
        Err(err) => match form_failure("create field group", err) {
            FormFailure::Errors(messages) => {
                render_form(&req, &ctx, None, &input, &locations, messages)
            }
            FormFailure::NotFound => Ok(redirect(ctx.url("/field-groups"))),
        },
    }
}

pub async fn edit_form(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let record = match field_groups::load(ctx.state().options.as_ref()) {
        Ok(collection) => collection.get(&id).cloned(),
        Err(err) => {
            report_load_failure(&ctx, "field groups", &err);
            None
        }
    };
    let Some(record) = record else {
        return Ok(redirect(ctx.url("/field-groups")));
    };
    let locations = location_options(&ctx);
    render_form(
        &req,
        &ctx,
        Some(&id),
        &FieldGroupInput::from_record(&record),
        &locations,
        Vec::new(),
    )
}

pub async fn update(
    req: HttpRequest,
    ctx: AdminContext,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let form = FormData::from(form.into_inner());
    let mut errors = ValidationErrors::new();
    if !ctx.verify_csrf(&form) {
        errors.push(TOKEN_ERROR);
    }
    let input = FieldGroupInput::from_form(&form, &mut errors);
    let locations = match field_groups::location_options(ctx.state().options.as_ref()) {
        Ok(locations) => locations,
        Err(err) => {
            log::error!("Failed to load field group locations: {}", err);
            return render_form(&req, &ctx, Some(&id), &input, &[], vec![SAVE_ERROR.to_string()]);
        }
    };

    match field_groups::update(
        ctx.state().options.as_ref(),
        &known(&locations),
        &id,
        &input,
        errors,
    ) {
        Ok(record) => {
            log::info!("Field group updated: {} by {}", record.id, ctx.actor.email);
            Ok(redirect(with_indicator(
                &ctx.url("/field-groups"),
                "updated",
                &record.id,
            )))
        }
        Err(err) => match form_failure("update field group", err) {
            FormFailure::Errors(messages) => {
                render_form(&req, &ctx, Some(&id), &input, &locations, messages)
            }
            FormFailure::NotFound => Ok(redirect(ctx.url("/field-groups"))),
        },
    }
}

pub async fn delete(ctx: AdminContext, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    let form = FormData::from(form.into_inner());
    let list_url = ctx.url("/field-groups");
    if !ctx.verify_csrf(&form) {
        ctx.flash(FlashKind::Error, TOKEN_ERROR);
        return redirect(with_indicator(&list_url, "error", "token"));
    }

    let id = form.text("id");
    match field_groups::delete(ctx.state().options.as_ref(), &id) {
        Ok(Some(record)) => {
            log::info!("Field group deleted: {} by {}", record.id, ctx.actor.email);
            redirect(with_indicator(&list_url, "deleted", "1"))
        }
        Ok(None) => redirect(with_indicator(&list_url, "deleted", "0")),
        Err(err) => {
            log::error!("Failed to delete field group '{}': {}", id, err);
            ctx.flash(FlashKind::Error, SAVE_ERROR);
            redirect(with_indicator(&list_url, "error", "save"))
        }
    }
}
