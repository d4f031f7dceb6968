// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::{appearance, field_groups, middleware, plugins, post_types, taxonomies};
use crate::config::ValidatedConfig;
use actix_web::{HttpResponse, Result, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, admin_path: &str, config: &Arc<ValidatedConfig>) {
    let admin_path = admin_path.trim_end_matches('/').to_string();
    let redirect_target = format!("{}/plugins", admin_path);
    let redirect_target_slash = redirect_target.clone();

    cfg.service(
        web::scope(&admin_path)
            .wrap(middleware::RequireRole::new(config.clone()))
            .route(
                "",
                web::get().to(move || admin_redirect(redirect_target.clone())),
            )
            .route(
                "/",
                web::get().to(move || admin_redirect(redirect_target_slash.clone())),
            )
            .configure(configure_plugins)
            .configure(configure_post_types)
            .configure(configure_taxonomies)
            .configure(configure_field_groups)
            .configure(configure_appearance),
    );
}

fn configure_plugins(cfg: &mut web::ServiceConfig) {
    cfg.route("/plugins", web::get().to(plugins::list))
        .route("/plugins/toggle", web::post().to(plugins::toggle));
}

fn configure_post_types(cfg: &mut web::ServiceConfig) {
    cfg.route("/post-types", web::get().to(post_types::list))
        .route("/post-types/new", web::get().to(post_types::new_form))
        .route("/post-types/new", web::post().to(post_types::create))
        .route("/post-types/edit/{slug}", web::get().to(post_types::edit_form))
        .route("/post-types/edit/{slug}", web::post().to(post_types::update))
        .route("/post-types/delete", web::post().to(post_types::delete));
}

fn configure_taxonomies(cfg: &mut web::ServiceConfig) {
    cfg.route("/taxonomies", web::get().to(taxonomies::list))
        .route("/taxonomies/new", web::get().to(taxonomies::new_form))
        .route("/taxonomies/new", web::post().to(taxonomies::create))
        .route("/taxonomies/edit/{id}", web::get().to(taxonomies::edit_form))
        .route("/taxonomies/edit/{id}", web::post().to(taxonomies::update))
        .route("/taxonomies/delete", web::post().to(taxonomies::delete));
}

fn configure_field_groups(cfg: &mut web::ServiceConfig) {
    cfg.route("/field-groups", web::get().to(field_groups::list))
        .route("/field-groups/new", web::get().to(field_groups::new_form))
        .route("/field-groups/new", web::post().to(field_groups::create))
        .route("/field-groups/edit/{id}", web::get().to(field_groups::edit_form))
        .route("/field-groups/edit/{id}", web::post().to(field_groups::update))
        .route("/field-groups/delete", web::post().to(field_groups::delete));
}

fn configure_appearance(cfg: &mut web::ServiceConfig) {
    cfg.route("/appearance/css/{target}", web::get().to(appearance::css_editor))
        .route("/appearance/css/{target}", web::post().to(appearance::css_save))
        .route("/appearance/login", web::get().to(appearance::login_editor))
        .route("/appearance/login", web::post().to(appearance::login_save))
        .route("/appearance/login/reset", web::post().to(appearance::login_reset))
        .route("/appearance/preview/{target}", web::get().to(appearance::preview));
}

async fn admin_redirect(location: String) -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header(("Location", location))
        .finish())
}
