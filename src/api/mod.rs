//! Clients for the namespace/document REST API.
//!
//! DESIGN
//! ======
//! [`VaultApi`] is the seam between the state manager / upload pipeline and
//! the transport. [`http::HttpVaultApi`] talks to the real server,
//! [`memory::MemoryApi`] keeps everything in process for offline use.
//!
//! ERROR HANDLING
//! ==============
//! Each call is one request with no retry and no timeout. Callers catch
//! [`ApiError`] and surface it as a toast; nothing here notifies.

pub mod http;
pub mod memory;
pub mod rag;
pub mod types;

use async_trait::async_trait;

use crate::upload::PendingFile;
use types::{DocumentQueryResponse, DocumentUploadResponse, NamespaceResponse, NamespaceWithTotalCnt};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The server returned a non-success HTTP status.
    #[error("API response error: status {status}: {message}")]
    Status { status: u16, message: String },

    /// The envelope reported `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client or request could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Message suitable for a toast: the server's wording when there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Namespace (vault) and document operations for one user.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// `GET /namespaces?userId=`
    async fn list_namespaces(&self) -> Result<Vec<NamespaceWithTotalCnt>, ApiError>;

    /// `POST /namespaces`
    async fn create_namespace(&self, name: &str, description: Option<&str>) -> Result<NamespaceResponse, ApiError>;

    /// `DELETE /namespaces/{id}?userId=`
    async fn delete_namespace(&self, namespace_id: &str) -> Result<(), ApiError>;

    /// `GET /namespaces/{id}/documents?userId=`
    async fn list_documents(&self, namespace_id: &str) -> Result<Vec<DocumentQueryResponse>, ApiError>;

    /// `POST /namespaces/{id}/documents` (multipart)
    async fn upload_document(&self, namespace_id: &str, file: &PendingFile) -> Result<DocumentUploadResponse, ApiError>;
}
