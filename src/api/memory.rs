//! In-process [`VaultApi`] backend for offline use.
//!
//! Mirrors the server contract closely enough for the CLI's demo mode:
//! server-assigned numeric ids, cascading namespace deletes, and per-namespace
//! document listing. File names registered with [`MemoryApi::reject_file`]
//! fail on upload the way a server-side processing error would.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::types::{DocumentQueryResponse, DocumentUploadResponse, NamespaceResponse, NamespaceWithTotalCnt};
use super::{ApiError, VaultApi};
use crate::model::{Document, Vault};
use crate::upload::PendingFile;

#[derive(Debug, Default)]
struct Inner {
    namespaces: Vec<NamespaceResponse>,
    documents: Vec<DocumentQueryResponse>,
    rejected: HashSet<String>,
    next_id: u64,
}

impl Inner {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn namespace_exists(&self, namespace_id: &str) -> bool {
        self.namespaces.iter().any(|ns| ns.id == namespace_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryApi {
    inner: Mutex<Inner>,
}

impl MemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with existing vaults and documents.
    ///
    /// New ids are allocated above the largest numeric id seen.
    #[must_use]
    pub fn mirroring(vaults: &[Vault], documents: &[Document]) -> Self {
        let namespaces: Vec<NamespaceResponse> = vaults
            .iter()
            .map(|v| NamespaceResponse {
                id: v.id.clone(),
                name: v.name.clone(),
                description: v.description.clone(),
                created_at: v.created_at,
            })
            .collect();
        let documents: Vec<DocumentQueryResponse> = documents
            .iter()
            .map(|d| DocumentQueryResponse {
                id: d.id.clone(),
                name: d.name.clone(),
                mime_type: d.mime_type.clone(),
                size: d.size,
                uploaded_at: d.uploaded_at,
                vault_id: d.vault_id.clone(),
            })
            .collect();
        let next_id = namespaces
            .iter()
            .map(|ns| ns.id.as_str())
            .chain(documents.iter().map(|d| d.id.as_str()))
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { inner: Mutex::new(Inner { namespaces, documents, rejected: HashSet::new(), next_id }) }
    }

    /// Make every upload of `file_name` fail.
    pub fn reject_file(&self, file_name: &str) {
        self.lock().rejected.insert(file_name.to_owned());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn not_found(namespace_id: &str) -> ApiError {
    ApiError::Status { status: 404, message: format!("namespace not found: {namespace_id}") }
}

#[async_trait]
impl VaultApi for MemoryApi {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceWithTotalCnt>, ApiError> {
        let inner = self.lock();
        Ok(inner
            .namespaces
            .iter()
            .map(|ns| NamespaceWithTotalCnt {
                namespace: ns.clone(),
                document_total_cnt: inner.documents.iter().filter(|d| d.vault_id == ns.id).count() as u64,
            })
            .collect())
    }

    async fn create_namespace(&self, name: &str, description: Option<&str>) -> Result<NamespaceResponse, ApiError> {
        let mut inner = self.lock();
        if inner.namespaces.iter().any(|ns| ns.name == name) {
            return Err(ApiError::Rejected(format!("namespace already exists: {name}")));
        }
        let namespace = NamespaceResponse {
            id: inner.allocate_id(),
            name: name.to_owned(),
            description: description.map(str::to_owned),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.namespaces.push(namespace.clone());
        Ok(namespace)
    }

    async fn delete_namespace(&self, namespace_id: &str) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if !inner.namespace_exists(namespace_id) {
            return Err(not_found(namespace_id));
        }
        inner.namespaces.retain(|ns| ns.id != namespace_id);
        inner.documents.retain(|d| d.vault_id != namespace_id);
        Ok(())
    }

    async fn list_documents(&self, namespace_id: &str) -> Result<Vec<DocumentQueryResponse>, ApiError> {
        let inner = self.lock();
        if !inner.namespace_exists(namespace_id) {
            return Err(not_found(namespace_id));
        }
        Ok(inner.documents.iter().filter(|d| d.vault_id == namespace_id).cloned().collect())
    }

    async fn upload_document(&self, namespace_id: &str, file: &PendingFile) -> Result<DocumentUploadResponse, ApiError> {
        let mut inner = self.lock();
        if !inner.namespace_exists(namespace_id) {
            return Err(not_found(namespace_id));
        }
        if inner.rejected.contains(&file.name) {
            return Err(ApiError::Status { status: 500, message: format!("upload failed: {}", file.name) });
        }
        let id = inner.allocate_id();
        let created_at = OffsetDateTime::now_utc();
        inner.documents.push(DocumentQueryResponse {
            id: id.clone(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            uploaded_at: created_at,
            vault_id: namespace_id.to_owned(),
        });
        Ok(DocumentUploadResponse { id, file_name: file.name.clone(), created_at })
    }
}
