// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::context::AdminContext;
use super::shared::{SAVE_ERROR, TOKEN_ERROR, redirect, render_page, report_load_failure, with_indicator};
use crate::content::ContentError;
use crate::content::plugins::{PluginCounts, PluginListing, StatusFilter};
use crate::util::{FlashKind, FormData};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::{Value, context};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PluginsQuery {
    status: Option<String>,
}

pub async fn list(
    req: HttpRequest,
    ctx: AdminContext,
    query: web::Query<PluginsQuery>,
) -> Result<HttpResponse> {
    let status = StatusFilter::parse(query.status.as_deref());
    let state = ctx.state();
    let listing = state
        .plugins
        .list(state.options.as_ref(), status)
        .unwrap_or_else(|err| {
            report_load_failure(&ctx, "plugins", &err);
            PluginListing {
                plugins: Vec::new(),
                counts: PluginCounts::default(),
                status,
            }
        });

    render_page(
        &req,
        &ctx,
        "admin/plugins.html",
        "plugins",
        "Plugins",
        context! {
            plugins => Value::from_serialize(&listing.plugins),
            counts => Value::from_serialize(listing.counts),
            status => listing.status.as_str(),
        },
    )
}

/// Flips one plugin and returns to the same filtered list.
pub async fn toggle(ctx: AdminContext, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    let form = FormData::from(form.into_inner());
    let status = StatusFilter::parse(form.get("status"));
    let list_url = ctx.url(&format!("/plugins?status={}", status.as_str()));

    if !ctx.verify_csrf(&form) {
        ctx.flash(FlashKind::Error, TOKEN_ERROR);
        return redirect(with_indicator(&list_url, "error", "token"));
    }

    let slug = form.text("slug");
    let state = ctx.state();
    match state.plugins.toggle(state.options.as_ref(), &slug) {
        Ok(true) => redirect(with_indicator(&list_url, "activated", &slug)),
        Ok(false) => redirect(with_indicator(&list_url, "deactivated", &slug)),
        Err(ContentError::Plugin(message)) => {
            log::warn!("Plugin '{}' could not be activated: {}", slug, message);
            ctx.flash(
                FlashKind::Error,
                format!("Plugin '{}' could not be activated: {}.", slug, message),
            );
            redirect(with_indicator(&list_url, "error", "plugin"))
        }
        Err(err) => {
            log::error!("Failed to toggle plugin '{}': {}", slug, err);
            ctx.flash(FlashKind::Error, SAVE_ERROR);
            redirect(with_indicator(&list_url, "error", "save"))
        }
    }
}
