// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const MAX_MESSAGES_PER_SESSION: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

/// One-shot status messages queued per session and drained by the next page render.
#[derive(Default)]
pub struct FlashStore {
    messages: Mutex<HashMap<String, Vec<FlashMessage>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<FlashMessage>>> {
        self.messages.lock().unwrap_or_else(|poisoned| {
            log::warn!("Flash store lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn set_flash(&self, session_id: &str, kind: FlashKind, text: impl Into<String>) {
        let mut guard = self.lock();
        let queue = guard.entry(session_id.to_string()).or_default();
        if queue.len() >= MAX_MESSAGES_PER_SESSION {
            queue.remove(0);
        }
        queue.push(FlashMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn take(&self, session_id: &str) -> Vec<FlashMessage> {
        self.lock().remove(session_id).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_messages_in_order() {
        let store = FlashStore::new();
        store.set_flash("s1", FlashKind::Success, "Saved");
        store.set_flash("s1", FlashKind::Error, "But not everything");

        let messages = store.take("s1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Saved");
        assert_eq!(messages[1].kind, FlashKind::Error);
        assert!(store.take("s1").is_empty());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = FlashStore::new();
        store.set_flash("s1", FlashKind::Success, "Mine");
        assert!(store.take("s2").is_empty());
        assert_eq!(store.take("s1").len(), 1);
    }

    #[test]
    fn queue_is_bounded() {
        let store = FlashStore::new();
        for index in 0..20 {
            store.set_flash("s1", FlashKind::Success, format!("message {}", index));
        }
        let messages = store.take("s1");
        assert_eq!(messages.len(), MAX_MESSAGES_PER_SESSION);
        assert_eq!(messages[0].text, "message 12");
    }
}
