//! Sidebar: vault tree, session history and upload trigger.
//!
//! Holds only presentation state (collapse, expanded vaults). Everything it
//! shows is read from the [`VaultStore`]; everything it changes goes back
//! through it.

#[cfg(test)]
#[path = "sidebar_test.rs"]
mod sidebar_test;

use std::collections::BTreeSet;
use std::fmt::Write as _;

use time::OffsetDateTime;

use crate::store::{StoreError, VaultStore};

#[derive(Debug, Default)]
pub struct Sidebar {
    collapsed: bool,
    expanded: BTreeSet<String>,
}

impl Sidebar {
    /// Start with the selected vault expanded.
    #[must_use]
    pub fn new(store: &VaultStore) -> Self {
        let expanded = store.selected_vault_id().map(str::to_owned).into_iter().collect();
        Self { collapsed: false, expanded }
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    #[must_use]
    pub fn is_expanded(&self, vault_id: &str) -> bool {
        self.expanded.contains(vault_id)
    }

    pub fn toggle_vault(&mut self, vault_id: &str) {
        if !self.expanded.remove(vault_id) {
            self.expanded.insert(vault_id.to_owned());
        }
    }

    /// Gate for opening the upload dialog: the target vault id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoVaultSelected`] (after toasting) when there
    /// is nowhere to upload to.
    pub fn request_upload(&self, store: &VaultStore) -> Result<String, StoreError> {
        store.require_selected_vault().map(|v| v.id.clone())
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Vault tree. Expanded vaults list their documents.
    #[must_use]
    pub fn render_vaults(&self, store: &VaultStore) -> String {
        if store.vaults().is_empty() {
            return "보관함이 없습니다\n".to_owned();
        }
        let mut out = String::new();
        for vault in store.vaults() {
            let marker = if store.selected_vault_id() == Some(vault.id.as_str()) { '*' } else { ' ' };
            let fold = if self.is_expanded(&vault.id) { 'v' } else { '>' };
            let _ = writeln!(out, "{marker} {fold} [{}] {} ({})", vault.id, vault.name, vault.document_count);
            if let Some(description) = &vault.description {
                let _ = writeln!(out, "      {description}");
            }
            if self.is_expanded(&vault.id) {
                let docs = store.documents_in(&vault.id);
                if docs.is_empty() {
                    let _ = writeln!(out, "      문서가 없습니다");
                }
                for doc in docs {
                    let _ = writeln!(out, "      - {}", doc.name);
                }
            }
        }
        out
    }

    /// Chat history for the selected vault.
    #[must_use]
    pub fn render_sessions(&self, store: &VaultStore, now: OffsetDateTime) -> String {
        let sessions = store.vault_sessions();
        if sessions.is_empty() {
            return "채팅 이력이 없습니다\n".to_owned();
        }
        let mut out = String::new();
        for session in sessions {
            let marker = if store.selected_session_id() == Some(session.id.as_str()) { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker} [{}] {} · {}",
                session.id,
                session.title,
                format_relative_date(session.last_message_at, now)
            );
        }
        out
    }

    /// Documents of the selected vault with size and upload date.
    #[must_use]
    pub fn render_documents(&self, store: &VaultStore) -> String {
        let docs = store.vault_documents();
        if docs.is_empty() {
            return "업로드된 문서가 없습니다\n".to_owned();
        }
        let mut out = String::new();
        for doc in docs {
            let date = doc.uploaded_at.date();
            let _ = writeln!(
                out,
                "  [{}] {} · {} · {}년 {}월 {}일",
                doc.id,
                doc.name,
                format_file_size(doc.size),
                date.year(),
                u8::from(date.month()),
                date.day()
            );
        }
        out
    }
}

/// `오늘`, `어제`, `N일 전` within a week, else `M월 D일`.
#[must_use]
pub fn format_relative_date(date: OffsetDateTime, now: OffsetDateTime) -> String {
    let days = (now - date).whole_days();
    match days {
        ..=0 => "오늘".to_owned(),
        1 => "어제".to_owned(),
        2..=6 => format!("{days}일 전"),
        _ => format!("{}월 {}일", u8::from(date.month()), date.day()),
    }
}

/// Human-readable size in 1024 steps, rounded to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
