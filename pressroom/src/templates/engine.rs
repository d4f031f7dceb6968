// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Environment, Value, default_auto_escape_callback};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "admin/layout.html" => Some(include_str!("../admin/templates/layout.html")),
        "admin/plugins.html" => Some(include_str!("../admin/templates/plugins.html")),

        // Collections
        "admin/post_types.html" => Some(include_str!("../admin/templates/post_types.html")),
        "admin/post_type_form.html" => {
            Some(include_str!("../admin/templates/post_type_form.html"))
        }
        "admin/taxonomies.html" => Some(include_str!("../admin/templates/taxonomies.html")),
        "admin/taxonomy_form.html" => Some(include_str!("../admin/templates/taxonomy_form.html")),
        "admin/field_groups.html" => Some(include_str!("../admin/templates/field_groups.html")),
        "admin/field_group_form.html" => {
            Some(include_str!("../admin/templates/field_group_form.html"))
        }
        "admin/field_rows.html" => Some(include_str!("../admin/templates/field_rows.html")),
        "admin/form_errors.html" => Some(include_str!("../admin/templates/form_errors.html")),

        // Appearance
        "admin/css_editor.html" => Some(include_str!("../admin/templates/css_editor.html")),
        "admin/login_editor.html" => Some(include_str!("../admin/templates/login_editor.html")),
        "admin/preview.html" => Some(include_str!("../admin/templates/preview.html")),
        "admin/live_preview_script.html" => {
            Some(include_str!("../admin/templates/live_preview_script.html"))
        }

        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}
