//! Vault, document and session state.
//!
//! DESIGN
//! ======
//! `VaultStore` is the single owner of every collection and the only place
//! they change. Mutations go through `&mut self`; async operations await the
//! API first and then apply their result in one step, so a failed request
//! never leaves a half-applied change behind.
//!
//! Each vault's `document_count` equals the number of documents owned by it
//! after every local mutation. After `load_vaults` the server's count is
//! kept until that vault's documents are loaded.
//!
//! ERROR HANDLING
//! ==============
//! Every failure path toasts through the injected notifier and returns a
//! [`StoreError`]; state is left as it was.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::OffsetDateTime;

use crate::api::{ApiError, VaultApi};
use crate::model::{ChatSession, Document, Vault, new_id};
use crate::notify::Notifier;

const EMPTY_NAME_TOAST: &str = "보관함 이름을 입력하세요";
const NO_VAULT_TOAST: &str = "먼저 문서 보관함을 선택하거나 생성해주세요";
const VAULT_DELETED_TOAST: &str = "보관함이 삭제되었습니다";

/// Errors produced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vault name is empty")]
    EmptyName,

    #[error("no vault selected")]
    NoVaultSelected,

    #[error("vault not found: {0}")]
    VaultNotFound(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct VaultStore {
    vaults: Vec<Vault>,
    documents: Vec<Document>,
    sessions: Vec<ChatSession>,
    selected_vault_id: Option<String>,
    selected_session_id: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl VaultStore {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            vaults: Vec::new(),
            documents: Vec::new(),
            sessions: Vec::new(),
            selected_vault_id: None,
            selected_session_id: None,
            notifier,
        }
    }

    /// Build a store from existing collections. Vault counts are recomputed
    /// from `documents` and the first vault is selected.
    #[must_use]
    pub fn from_parts(
        vaults: Vec<Vault>,
        documents: Vec<Document>,
        sessions: Vec<ChatSession>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let selected_vault_id = vaults.first().map(|v| v.id.clone());
        let mut store = Self { vaults, documents, sessions, selected_vault_id, selected_session_id: None, notifier };
        let ids: Vec<String> = store.vaults.iter().map(|v| v.id.clone()).collect();
        for id in &ids {
            store.recount(id);
        }
        store
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn vaults(&self) -> &[Vault] {
        &self.vaults
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    #[must_use]
    pub fn selected_vault_id(&self) -> Option<&str> {
        self.selected_vault_id.as_deref()
    }

    #[must_use]
    pub fn selected_session_id(&self) -> Option<&str> {
        self.selected_session_id.as_deref()
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    #[must_use]
    pub fn vault(&self, id: &str) -> Option<&Vault> {
        self.vaults.iter().find(|v| v.id == id)
    }

    #[must_use]
    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    // =========================================================================
    // DERIVED VIEWS
    // =========================================================================

    #[must_use]
    pub fn selected_vault(&self) -> Option<&Vault> {
        self.selected_vault_id.as_deref().and_then(|id| self.vault(id))
    }

    #[must_use]
    pub fn selected_session(&self) -> Option<&ChatSession> {
        self.selected_session_id.as_deref().and_then(|id| self.session(id))
    }

    /// Documents owned by `vault_id`, in insertion order.
    #[must_use]
    pub fn documents_in(&self, vault_id: &str) -> Vec<&Document> {
        self.documents.iter().filter(|d| d.vault_id == vault_id).collect()
    }

    /// Documents of the selected vault.
    #[must_use]
    pub fn vault_documents(&self) -> Vec<&Document> {
        self.selected_vault_id.as_deref().map(|id| self.documents_in(id)).unwrap_or_default()
    }

    /// Sessions of the selected vault, most recent first.
    #[must_use]
    pub fn vault_sessions(&self) -> Vec<&ChatSession> {
        let Some(vault_id) = self.selected_vault_id.as_deref() else {
            return Vec::new();
        };
        self.sessions.iter().filter(|s| s.vault_id == vault_id).collect()
    }

    // =========================================================================
    // VAULTS
    // =========================================================================

    /// Create a vault locally and select it. The selected session is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] for a blank name.
    pub fn create_vault(&mut self, name: &str, description: Option<&str>) -> Result<Vault, StoreError> {
        let name = self.validate_name(name)?;
        let vault = Vault::new(name, normalize_description(description));
        Ok(self.insert_vault(vault))
    }

    /// Delete a vault together with its documents and sessions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VaultNotFound`] for an unknown id.
    pub fn delete_vault(&mut self, id: &str) -> Result<Vault, StoreError> {
        let Some(index) = self.vaults.iter().position(|v| v.id == id) else {
            return Err(self.fail(StoreError::VaultNotFound(id.to_owned())));
        };
        let vault = self.vaults.remove(index);
        self.documents.retain(|d| d.vault_id != id);
        self.sessions.retain(|s| s.vault_id != id);

        if self.selected_vault_id.as_deref() == Some(id) {
            self.selected_vault_id = self.vaults.first().map(|v| v.id.clone());
            self.selected_session_id = None;
        }
        tracing::info!(vault_id = %id, "vault deleted");
        self.notifier.success(VAULT_DELETED_TOAST);
        Ok(vault)
    }

    /// Select a vault. The selected session is always cleared.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VaultNotFound`] for an unknown id.
    pub fn select_vault(&mut self, id: &str) -> Result<(), StoreError> {
        if self.vault(id).is_none() {
            return Err(self.fail(StoreError::VaultNotFound(id.to_owned())));
        }
        self.selected_vault_id = Some(id.to_owned());
        self.selected_session_id = None;
        tracing::debug!(vault_id = %id, "vault selected");
        Ok(())
    }

    /// The selected vault, or an error toast asking the user to pick one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoVaultSelected`] when nothing is selected.
    pub fn require_selected_vault(&self) -> Result<&Vault, StoreError> {
        match self.selected_vault() {
            Some(vault) => Ok(vault),
            None => {
                self.notifier.error(NO_VAULT_TOAST);
                Err(StoreError::NoVaultSelected)
            }
        }
    }

    // =========================================================================
    // DOCUMENTS
    // =========================================================================

    /// Append a batch and bump each owning vault's count once.
    pub fn upload_documents(&mut self, new_docs: Vec<Document>) {
        let mut added: HashMap<String, usize> = HashMap::new();
        for doc in &new_docs {
            *added.entry(doc.vault_id.clone()).or_default() += 1;
        }
        for vault in &mut self.vaults {
            if let Some(n) = added.get(&vault.id) {
                vault.document_count += n;
            }
        }
        tracing::info!(documents = new_docs.len(), vaults = added.len(), "documents added");
        self.documents.extend(new_docs);
    }

    /// Remove a document and decrement its vault's count, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] for an unknown id.
    pub fn delete_document(&mut self, id: &str) -> Result<Document, StoreError> {
        let Some(index) = self.documents.iter().position(|d| d.id == id) else {
            return Err(self.fail(StoreError::DocumentNotFound(id.to_owned())));
        };
        let doc = self.documents.remove(index);
        if let Some(vault) = self.vaults.iter_mut().find(|v| v.id == doc.vault_id) {
            vault.document_count = vault.document_count.saturating_sub(1);
        }
        tracing::info!(document_id = %id, vault_id = %doc.vault_id, "document deleted");
        self.notifier.success(&format!("\"{}\"이(가) 삭제되었습니다", doc.name));
        Ok(doc)
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    /// Start a session in `vault_id`, put it first and select it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VaultNotFound`] for an unknown vault.
    pub fn create_session(&mut self, vault_id: &str, title: &str) -> Result<ChatSession, StoreError> {
        if self.vault(vault_id).is_none() {
            return Err(self.fail(StoreError::VaultNotFound(vault_id.to_owned())));
        }
        let now = OffsetDateTime::now_utc();
        let session = ChatSession {
            id: new_id(),
            title: title.to_owned(),
            vault_id: vault_id.to_owned(),
            created_at: now,
            last_message_at: now,
        };
        self.sessions.insert(0, session.clone());
        self.selected_session_id = Some(session.id.clone());
        tracing::info!(session_id = %session.id, vault_id, "session created");
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] for an unknown id.
    pub fn delete_session(&mut self, id: &str) -> Result<ChatSession, StoreError> {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return Err(self.fail(StoreError::SessionNotFound(id.to_owned())));
        };
        let session = self.sessions.remove(index);
        if self.selected_session_id.as_deref() == Some(id) {
            self.selected_session_id = None;
        }
        tracing::info!(session_id = %id, "session deleted");
        Ok(session)
    }

    /// Select a session, or `None` to start a new conversation. Selecting a
    /// session from another vault moves the vault selection with it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] for an unknown id.
    pub fn select_session(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        let Some(id) = id else {
            self.selected_session_id = None;
            return Ok(());
        };
        let Some(vault_id) = self.session(id).map(|s| s.vault_id.clone()) else {
            return Err(self.fail(StoreError::SessionNotFound(id.to_owned())));
        };
        self.selected_vault_id = Some(vault_id);
        self.selected_session_id = Some(id.to_owned());
        Ok(())
    }

    /// Bump `last_message_at` on a session. Unknown ids are ignored.
    pub fn touch_session(&mut self, id: &str) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            session.last_message_at = OffsetDateTime::now_utc();
        }
    }

    // =========================================================================
    // NETWORKED
    // =========================================================================

    /// Replace the vault list with the server's.
    ///
    /// Server counts are taken as-is. Documents and sessions of vanished
    /// vaults are dropped; a vanished selection falls to the first vault.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] if the request fails.
    pub async fn load_vaults(&mut self, api: &dyn VaultApi) -> Result<(), StoreError> {
        let rows = match api.list_namespaces().await {
            Ok(rows) => rows,
            Err(e) => return Err(self.api_failure(e)),
        };
        self.vaults = rows.into_iter().map(Vault::from).collect();

        let live: HashSet<&str> = self.vaults.iter().map(|v| v.id.as_str()).collect();
        self.documents.retain(|d| live.contains(d.vault_id.as_str()));
        self.sessions.retain(|s| live.contains(s.vault_id.as_str()));

        let selection_alive = self.selected_vault_id.as_deref().is_some_and(|id| live.contains(id));
        if !selection_alive {
            self.selected_vault_id = self.vaults.first().map(|v| v.id.clone());
            self.selected_session_id = None;
        }
        tracing::info!(vaults = self.vaults.len(), "vaults loaded");
        Ok(())
    }

    /// Replace one vault's documents with the server's and recount it.
    ///
    /// Documents already held locally keep their extracted text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] if the request fails.
    pub async fn load_documents(&mut self, api: &dyn VaultApi, vault_id: &str) -> Result<(), StoreError> {
        let rows = match api.list_documents(vault_id).await {
            Ok(rows) => rows,
            Err(e) => return Err(self.api_failure(e)),
        };

        let mut known: HashMap<String, Option<String>> = HashMap::new();
        self.documents.retain_mut(|d| {
            if d.vault_id == vault_id {
                known.insert(d.id.clone(), d.content.take());
                false
            } else {
                true
            }
        });
        let fetched = rows.into_iter().map(|row| {
            let mut doc = Document::from(row);
            doc.vault_id = vault_id.to_owned();
            doc.content = known.remove(&doc.id).flatten();
            doc
        });
        self.documents.extend(fetched);
        self.recount(vault_id);
        tracing::info!(vault_id, documents = self.documents_in(vault_id).len(), "documents loaded");
        Ok(())
    }

    /// Create a vault on the server, then locally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] before any request, or
    /// [`StoreError::Api`] if the server refuses.
    pub async fn create_vault_remote(
        &mut self,
        api: &dyn VaultApi,
        name: &str,
        description: Option<&str>,
    ) -> Result<Vault, StoreError> {
        let name = self.validate_name(name)?;
        let description = normalize_description(description);
        match api.create_namespace(&name, description.as_deref()).await {
            Ok(namespace) => Ok(self.insert_vault(namespace.into_vault(0))),
            Err(e) => Err(self.api_failure(e)),
        }
    }

    /// Delete a vault on the server, then locally. Nothing is sent for a
    /// vault the store does not hold.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VaultNotFound`] if the vault is not held
    /// locally, or [`StoreError::Api`] if the server refuses.
    pub async fn delete_vault_remote(&mut self, api: &dyn VaultApi, id: &str) -> Result<Vault, StoreError> {
        if self.vault(id).is_none() {
            return Err(self.fail(StoreError::VaultNotFound(id.to_owned())));
        }
        if let Err(e) = api.delete_namespace(id).await {
            return Err(self.api_failure(e));
        }
        self.delete_vault(id)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn validate_name(&self, name: &str) -> Result<String, StoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.notifier.error(EMPTY_NAME_TOAST);
            return Err(StoreError::EmptyName);
        }
        Ok(trimmed.to_owned())
    }

    fn insert_vault(&mut self, vault: Vault) -> Vault {
        tracing::info!(vault_id = %vault.id, name = %vault.name, "vault created");
        self.selected_vault_id = Some(vault.id.clone());
        self.vaults.push(vault.clone());
        vault
    }

    fn recount(&mut self, vault_id: &str) {
        let count = self.documents.iter().filter(|d| d.vault_id == vault_id).count();
        if let Some(vault) = self.vaults.iter_mut().find(|v| v.id == vault_id) {
            vault.document_count = count;
        }
    }

    fn fail(&self, err: StoreError) -> StoreError {
        tracing::warn!(error = %err, "store operation failed");
        self.notifier.error(&err.to_string());
        err
    }

    fn api_failure(&self, err: ApiError) -> StoreError {
        tracing::warn!(error = %err, "api call failed");
        self.notifier.error(&err.user_message());
        StoreError::Api(err)
    }
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description.map(str::trim).filter(|d| !d.is_empty()).map(str::to_owned)
}
