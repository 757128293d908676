//! Domain types shared by the store, chat panel, scorer, and API clients.
//!
//! DESIGN
//! ======
//! One `Document` type serves both the in-memory variant (which carries the
//! extracted text used for scoring) and the networked variant (which does
//! not). `content` is therefore optional rather than split across two types.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Generate a fresh opaque id for locally created entities.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// VAULT
// =============================================================================

/// A named document namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Cached count of documents whose `vault_id` is this vault.
    pub document_count: usize,
}

impl Vault {
    /// Build an empty vault with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description,
            created_at: OffsetDateTime::now_utc(),
            document_count: 0,
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A file registered in a vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// MIME type reported at upload time.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    pub vault_id: String,
    /// Extracted text, present only when the document was built locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Document {
    /// Text used for scoring and excerpts; empty for server-side documents.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// A conversation thread scoped to one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub vault_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_message_at: OffsetDateTime,
}

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A cited excerpt attached to an assistant reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub document_name: String,
    pub excerpt: String,
    /// Relevance percentage in `0..=100`.
    pub relevance: u8,
}

/// A single chat message. Messages are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// Confidence percentage in `0..=100`, assistant replies only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// A user-authored message stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            content: content.into(),
            sources: None,
            confidence: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// An assistant reply stamped now. An empty source list is stored as `None`.
    #[must_use]
    pub fn assistant(content: impl Into<String>, sources: Vec<Source>, confidence: Option<u8>) -> Self {
        Self {
            id: new_id(),
            role: Role::Assistant,
            content: content.into(),
            sources: if sources.is_empty() { None } else { Some(sources) },
            confidence,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
