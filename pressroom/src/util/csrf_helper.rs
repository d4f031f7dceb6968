// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

const CSRF_TOKEN_EXPIRY_SECONDS: u64 = 3600;

/// Form field every mutating admin form carries.
pub const CSRF_FIELD_NAME: &str = "csrf_token";

#[derive(Clone, Debug)]
struct CsrfTokenData {
    created_at: Instant,
    session_id: String,
}

/// Anti-forgery tokens bound to a session id. Tokens are renewed on
/// successful validation rather than consumed, so one token serves every
/// form rendered for the session until it expires.
#[derive(Clone)]
pub struct CsrfTokenStore {
    sender: mpsc::Sender<CsrfCommand>,
}

enum CsrfCommand {
    #[cfg(test)]
    GetNewToken {
        session_id: String,
        reply: mpsc::Sender<String>,
    },
    GetOrRefresh {
        session_id: String,
        reply: mpsc::Sender<String>,
    },
    ValidateAndRenew {
        token_value: String,
        session_id: String,
        reply: mpsc::Sender<bool>,
    },
    #[cfg(test)]
    SnapshotSessionIds {
        reply: mpsc::Sender<HashMap<String, String>>,
    },
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfTokenStore {
    pub fn new() -> Self {
        CsrfTokenStore {
            sender: start_csrf_worker(),
        }
    }

    fn generate_new_token_value() -> String {
        Uuid::new_v4().to_string()
    }

    fn request<T>(&self, build: impl FnOnce(mpsc::Sender<T>) -> CsrfCommand, fallback: T) -> T {
        let (reply, receive) = mpsc::channel();
        if self.sender.send(build(reply)).is_err() {
            log::error!("🚨 CRITICAL: CsrfTokenStore channel closed");
            return fallback;
        }
        receive.recv().unwrap_or(fallback)
    }

    #[cfg(test)]
    pub fn get_new_token(&self, session_id: &str) -> String {
        self.request(
            |reply| CsrfCommand::GetNewToken {
                session_id: session_id.to_string(),
                reply,
            },
            String::new(),
        )
    }

    /// Returns the live token for the session, issuing one if none exists.
    pub fn get_or_refresh_token(&self, session_id: &str) -> String {
        self.request(
            |reply| CsrfCommand::GetOrRefresh {
                session_id: session_id.to_string(),
                reply,
            },
            String::new(),
        )
    }

    pub fn validate_and_renew_token(&self, token_value: &str, session_id: &str) -> bool {
        self.request(
            |reply| CsrfCommand::ValidateAndRenew {
                token_value: token_value.to_string(),
                session_id: session_id.to_string(),
                reply,
            },
            false,
        )
    }

    /// Checks a submitted form token. Missing or blank tokens never reach the worker.
    pub fn verify_form_token(&self, submitted: Option<&str>, session_id: &str) -> bool {
        match submitted.map(str::trim) {
            Some(token) if !token.is_empty() => self.validate_and_renew_token(token, session_id),
            _ => false,
        }
    }

    #[cfg(test)]
    fn snapshot_session_ids(&self) -> HashMap<String, String> {
        self.request(
            |reply| CsrfCommand::SnapshotSessionIds { reply },
            HashMap::new(),
        )
    }
}

fn start_csrf_worker() -> mpsc::Sender<CsrfCommand> {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::Builder::new().name("csrf-token-store".to_string());
    if let Err(err) = thread.spawn(move || run_csrf_worker(receiver)) {
        log::error!("CsrfTokenStore worker failed to start: {}", err);
    }
    sender
}

fn run_csrf_worker(receiver: mpsc::Receiver<CsrfCommand>) {
    let mut tokens: HashMap<String, CsrfTokenData> = HashMap::new();
    while let Ok(command) = receiver.recv() {
        let now = Instant::now();
        cleanup_expired_tokens(&mut tokens, now);
        match command {
            #[cfg(test)]
            CsrfCommand::GetNewToken { session_id, reply } => {
                let new_token_value = CsrfTokenStore::generate_new_token_value();
                tokens.insert(
                    new_token_value.clone(),
                    CsrfTokenData {
                        created_at: now,
                        session_id,
                    },
                );
                let _ = reply.send(new_token_value);
            }
            CsrfCommand::GetOrRefresh { session_id, reply } => {
                let refreshed = tokens
                    .iter_mut()
                    .find(|(_, data)| data.session_id == session_id)
                    .map(|(token_value, data)| {
                        data.created_at = now;
                        token_value.clone()
                    });

                let token_value = refreshed.unwrap_or_else(|| {
                    let new_token_value = CsrfTokenStore::generate_new_token_value();
                    tokens.insert(
                        new_token_value.clone(),
                        CsrfTokenData {
                            created_at: now,
                            session_id: session_id.clone(),
                        },
                    );
                    log::debug!("Created new CSRF token for session: {}", session_id);
                    new_token_value
                });

                let _ = reply.send(token_value);
            }
            CsrfCommand::ValidateAndRenew {
                token_value,
                session_id,
                reply,
            } => {
                let is_valid = match tokens.get_mut(&token_value) {
                    Some(token_data) if token_data.session_id == session_id => {
                        token_data.created_at = now;
                        true
                    }
                    Some(token_data) => {
                        log::warn!(
                            "CSRF token session mismatch. Expected: {}, Got: {}",
                            token_data.session_id,
                            session_id
                        );
                        tokens.remove(&token_value);
                        false
                    }
                    None => false,
                };
                let _ = reply.send(is_valid);
            }
            #[cfg(test)]
            CsrfCommand::SnapshotSessionIds { reply } => {
                let snapshot = tokens
                    .iter()
                    .map(|(token, data)| (token.clone(), data.session_id.clone()))
                    .collect();
                let _ = reply.send(snapshot);
            }
        }
    }
}

fn cleanup_expired_tokens(tokens: &mut HashMap<String, CsrfTokenData>, now: Instant) {
    tokens.retain(|_, token_data| {
        now.duration_since(token_data.created_at) < Duration::from_secs(CSRF_TOKEN_EXPIRY_SECONDS)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tokens_are_unique_and_bound_to_session() {
        let store = CsrfTokenStore::new();
        let token1 = store.get_new_token("session-1");
        let token2 = store.get_new_token("session-1");
        assert_ne!(token1, token2);

        let tokens = store.snapshot_session_ids();
        assert_eq!(tokens.get(&token1).map(String::as_str), Some("session-1"));
        assert_eq!(tokens.get(&token2).map(String::as_str), Some("session-1"));
    }

    #[test]
    fn validation_renews_instead_of_consuming() {
        let store = CsrfTokenStore::new();
        let token = store.get_new_token("session");

        assert!(store.validate_and_renew_token(&token, "session"));
        assert!(store.snapshot_session_ids().contains_key(&token));
        assert!(store.validate_and_renew_token(&token, "session"));
    }

    #[test]
    fn session_mismatch_revokes_token() {
        let store = CsrfTokenStore::new();
        let token = store.get_new_token("session");

        assert!(!store.validate_and_renew_token(&token, "other-session"));
        assert!(!store.snapshot_session_ids().contains_key(&token));
        assert!(!store.validate_and_renew_token(&token, "session"));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let store = CsrfTokenStore::new();
        let _valid = store.get_new_token("session");
        assert!(!store.validate_and_renew_token("invalid-token", "session"));
    }

    #[test]
    fn get_or_refresh_reuses_live_token() {
        let store = CsrfTokenStore::new();
        let token1 = store.get_or_refresh_token("session");
        let token2 = store.get_or_refresh_token("session");
        assert!(!token1.is_empty());
        assert_eq!(token1, token2);

        let other = store.get_or_refresh_token("another");
        assert_ne!(token1, other);
    }

    #[test]
    fn verify_form_token_rejects_missing_and_blank() {
        let store = CsrfTokenStore::new();
        let token = store.get_or_refresh_token("session");

        assert!(!store.verify_form_token(None, "session"));
        assert!(!store.verify_form_token(Some("   "), "session"));
        assert!(store.verify_form_token(Some(&token), "session"));
    }

    #[test]
    fn tokens_are_uuid_formatted() {
        let store = CsrfTokenStore::new();
        let token = store.get_new_token("session");
        assert_eq!(token.len(), 36);
        assert_eq!(token.chars().filter(|&c| c == '-').count(), 4);
    }
}
