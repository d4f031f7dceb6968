// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::util::FlashMessage;
use minijinja::{Value, context};

/// Chrome shared by every admin page. The page's own data is nested under `page`.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    app_name: String,
    admin_path: String,
    section: String,
    title: String,
    actor_name: String,
    csrf_field: String,
    csrf_token: String,
    flashes: Vec<FlashMessage>,
    notice: Option<String>,
    custom_admin_css: String,
    csp_nonce: String,
}

impl LayoutContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        app_name: &str,
        admin_path: &str,
        section: &str,
        title: &str,
        actor_name: &str,
        csrf_field: &str,
        csrf_token: &str,
        csp_nonce: &str,
    ) -> Self {
        Self {
            app_name: app_name.to_string(),
            admin_path: admin_path.to_string(),
            section: section.to_string(),
            title: title.to_string(),
            actor_name: actor_name.to_string(),
            csrf_field: csrf_field.to_string(),
            csrf_token: csrf_token.to_string(),
            flashes: Vec::new(),
            notice: None,
            custom_admin_css: String::new(),
            csp_nonce: csp_nonce.to_string(),
        }
    }

    pub fn with_flashes(mut self, flashes: Vec<FlashMessage>) -> Self {
        self.flashes = flashes;
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Stylesheet text already made safe for a `<style>` element.
    pub fn with_custom_admin_css(mut self, css: String) -> Self {
        self.custom_admin_css = css;
        self
    }

    pub fn to_value(&self, page: Value) -> Value {
        context! {
            app_name => &self.app_name,
            admin_path => &self.admin_path,
            section => &self.section,
            title => &self.title,
            actor_name => &self.actor_name,
            csrf_field => &self.csrf_field,
            csrf_token => &self.csrf_token,
            flashes => Value::from_serialize(&self.flashes),
            notice => &self.notice,
            custom_admin_css => &self.custom_admin_css,
            csp_nonce => &self.csp_nonce,
            page => page
        }
    }
}

/// Stand-alone document rendered inside the live preview frame.
#[derive(Debug, Clone)]
pub struct PreviewContext {
    target: String,
    title: String,
    base_css: String,
    css: String,
    csp_nonce: String,
}

impl PreviewContext {
    pub fn new(target: &str, title: &str, base_css: String, css: String, csp_nonce: &str) -> Self {
        Self {
            target: target.to_string(),
            title: title.to_string(),
            base_css,
            css,
            csp_nonce: csp_nonce.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            target => &self.target,
            title => &self.title,
            base_css => &self.base_css,
            css => &self.css,
            csp_nonce => &self.csp_nonce
        }
    }
}
