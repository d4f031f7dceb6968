// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::{Actor, AuthRequest};
use crate::util::{CSRF_FIELD_NAME, FlashKind, FlashMessage, FormData};
use actix_web::dev::Payload;
use actix_web::error::{ErrorForbidden, ErrorInternalServerError};
use actix_web::{Error, FromRequest, HttpRequest, web};
use std::future::{Ready, ready};

/// Per-request admin values: who is acting, their session, and the
/// anti-forgery token every form on the page carries.
pub struct AdminContext {
    pub actor: Actor,
    pub session_id: String,
    pub csrf_token: String,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
}

impl AdminContext {
    fn resolve(req: &HttpRequest) -> Result<Self, Error> {
        let state = req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
            log::error!("AppState missing from app data");
            ErrorInternalServerError("Application state unavailable")
        })?;
        let config = req
            .app_data::<web::Data<ValidatedConfig>>()
            .cloned()
            .ok_or_else(|| {
                log::error!("ValidatedConfig missing from app data");
                ErrorInternalServerError("Application state unavailable")
            })?;
        let (Some(actor), Some(session_id)) = (req.actor(), req.session_id()) else {
            return Err(ErrorForbidden("Forbidden"));
        };
        let csrf_token = state.csrf.get_or_refresh_token(&session_id);

        Ok(Self {
            actor,
            session_id,
            csrf_token,
            state,
            config,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Absolute URL of an admin page, e.g. `url("/plugins")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.admin.path.trim_end_matches('/'), path)
    }

    /// Checks the submitted anti-forgery token. A valid token is renewed, not consumed.
    pub fn verify_csrf(&self, form: &FormData) -> bool {
        let valid = self
            .state
            .csrf
            .verify_form_token(form.get(CSRF_FIELD_NAME), &self.session_id);
        if !valid {
            log::warn!(
                "Rejected admin form with invalid anti-forgery token from {}",
                self.actor.email
            );
        }
        valid
    }

    pub fn flash(&self, kind: FlashKind, text: impl Into<String>) {
        self.state.flash.set_flash(&self.session_id, kind, text);
    }

    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        self.state.flash.take(&self.session_id)
    }
}

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::resolve(req))
    }
}
