//! Chat panel: the message list for the open session.
//!
//! DESIGN
//! ======
//! Messages belong to the panel, not the store, and are discarded whenever
//! the selected session changes. Sessions themselves are created lazily by
//! the first question asked in a vault.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use crate::api::ApiError;
use crate::api::rag::RagClient;
use crate::model::{Document, Message, Role};
use crate::notify::Notifier as _;
use crate::retrieval::{ScoredDocument, score};
use crate::store::{StoreError, VaultStore};
use crate::synth::synthesize;

/// Canned prompts offered on an empty conversation.
pub const SAMPLE_QUESTIONS: [&str; 4] = [
    "이 문서의 주요 내용을 요약해주세요",
    "시스템 요구사항이 무엇인가요?",
    "어떤 기능들이 있나요?",
    "사용 방법을 알려주세요",
];

/// Session titles keep this many characters of the first question.
pub const TITLE_CHARS: usize = 30;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("no vault selected")]
    NoVaultSelected,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Title for a session started by `query`.
#[must_use]
pub fn session_title(query: &str) -> String {
    if query.chars().count() > TITLE_CHARS {
        let head: String = query.chars().take(TITLE_CHARS).collect();
        format!("{head}...")
    } else {
        query.to_owned()
    }
}

/// Opening assistant line for a conversation in the selected vault.
#[must_use]
pub fn greeting(store: &VaultStore) -> String {
    match store.selected_vault() {
        Some(vault) => format!(
            "\"{}\" 보관함의 문서에 대해 질문해주세요. {}개의 문서가 준비되어 있습니다.",
            vault.name, vault.document_count
        ),
        None => "문서 보관함을 선택하고 질문해주세요.".to_owned(),
    }
}

#[derive(Debug, Default)]
pub struct ChatPanel {
    messages: Vec<Message>,
    session_id: Option<String>,
    synced: bool,
}

impl ChatPanel {
    /// A panel already showing the greeting for the store's selection.
    #[must_use]
    pub fn new(store: &VaultStore) -> Self {
        let mut panel = Self::default();
        panel.sync(store);
        panel
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// True while nothing but the greeting has been said.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.messages.iter().all(|m| m.role == Role::Assistant && m.sources.is_none() && m.confidence.is_none())
    }

    /// Follow the store's session selection, resetting on change.
    pub fn sync(&mut self, store: &VaultStore) {
        let selected = store.selected_session_id();
        if self.synced && self.session_id.as_deref() == selected {
            return;
        }
        self.synced = true;
        self.session_id = selected.map(str::to_owned);
        self.messages.clear();
        if self.session_id.is_none() {
            self.messages.push(Message::assistant(greeting(store), Vec::new(), None));
        }
        tracing::debug!(session_id = ?self.session_id, "chat panel reset");
    }

    /// Re-render the greeting after the selected vault changed without a
    /// session change (new vault, new document count).
    pub fn refresh_greeting(&mut self, store: &VaultStore) {
        self.synced = false;
        self.sync(store);
    }

    /// Answer `query` locally from the selected vault's documents.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank query or when no vault is selected.
    pub fn ask(&mut self, store: &mut VaultStore, query: &str) -> Result<Message, ChatError> {
        let (query, sources) = self.begin(store, query)?;
        let reply = synthesize(&query, &sources);
        tracing::info!(sources = sources.len(), confidence = reply.confidence, "local answer");
        let message = Message::assistant(
            reply.content,
            sources.into_iter().map(ScoredDocument::into_source).collect(),
            Some(reply.confidence),
        );
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Answer `query` through the RAG service, citing local matches.
    ///
    /// The service is called before anything is recorded, so a failed call
    /// leaves the store's sessions and the panel untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank query, when no vault is selected, or
    /// when the service call fails (after toasting).
    pub async fn ask_remote(&mut self, store: &mut VaultStore, rag: &RagClient, query: &str) -> Result<Message, ChatError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyQuery);
        }
        store.require_selected_vault().map_err(|_| ChatError::NoVaultSelected)?;

        let answer = match rag.ask(trimmed).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "rag answer failed");
                store.notifier().error(&e.user_message());
                return Err(e.into());
            }
        };
        let (_, sources) = self.begin(store, trimmed)?;
        let message = Message::assistant(answer, sources.into_iter().map(ScoredDocument::into_source).collect(), None);
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Validate, ensure a session, record the user message, and score.
    fn begin(&mut self, store: &mut VaultStore, query: &str) -> Result<(String, Vec<ScoredDocument>), ChatError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChatError::EmptyQuery);
        }
        let vault_id = store
            .require_selected_vault()
            .map_err(|_| ChatError::NoVaultSelected)?
            .id
            .clone();
        self.sync(store);

        match store.selected_session_id().map(str::to_owned) {
            Some(session_id) => store.touch_session(&session_id),
            None => {
                let session = store.create_session(&vault_id, &session_title(query))?;
                self.session_id = Some(session.id);
            }
        }

        self.messages.push(Message::user(query));
        let documents: Vec<Document> = store.vault_documents().into_iter().cloned().collect();
        Ok((query.to_owned(), score(query, &documents)))
    }
}
