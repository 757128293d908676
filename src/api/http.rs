//! `reqwest` implementation of [`VaultApi`].
//!
//! Thin HTTP wrapper. URL building and envelope parsing are pure functions
//! so they can be tested without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::types::{
    CreateNamespaceRequest, DocumentQueryResponse, DocumentUploadResponse, NamespaceResponse, NamespaceWithTotalCnt,
    expect_data, parse_envelope,
};
use super::{ApiError, VaultApi};
use crate::upload::PendingFile;

/// Where the API lives and who is calling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root including the version prefix, e.g. `http://host/api/v1`.
    pub base_url: String,
    pub user_id: String,
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Append `segments` to the base URL's path, percent-encoding each one.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::HttpClientBuild(format!("invalid base URL {base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::HttpClientBuild(format!("base URL cannot take a path: {base_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn namespaces_endpoint(base_url: &str) -> Result<Url, ApiError> {
    endpoint(base_url, &["namespaces"])
}

fn namespace_endpoint(base_url: &str, namespace_id: &str) -> Result<Url, ApiError> {
    endpoint(base_url, &["namespaces", namespace_id])
}

fn documents_endpoint(base_url: &str, namespace_id: &str) -> Result<Url, ApiError> {
    endpoint(base_url, &["namespaces", namespace_id, "documents"])
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpVaultApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl HttpVaultApi {
    /// Build a client. No request timeout is set; transport defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<Option<T>, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "api response");
        parse_envelope(status.as_u16(), status.canonical_reason().unwrap_or("unknown status"), &text)
    }

    fn user_query(&self) -> [(&'static str, &str); 1] {
        [("userId", self.config.user_id.as_str())]
    }
}

#[async_trait]
impl VaultApi for HttpVaultApi {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceWithTotalCnt>, ApiError> {
        let url = namespaces_endpoint(&self.config.base_url)?;
        tracing::debug!(%url, "listing namespaces");
        let data = self.execute(self.http.get(url).query(&self.user_query())).await?;
        Ok(data.unwrap_or_default())
    }

    async fn create_namespace(&self, name: &str, description: Option<&str>) -> Result<NamespaceResponse, ApiError> {
        let url = namespaces_endpoint(&self.config.base_url)?;
        let body = CreateNamespaceRequest { user_id: &self.config.user_id, name, description };
        tracing::debug!(%url, name, "creating namespace");
        expect_data(self.execute(self.http.post(url).json(&body)).await?)
    }

    async fn delete_namespace(&self, namespace_id: &str) -> Result<(), ApiError> {
        let url = namespace_endpoint(&self.config.base_url, namespace_id)?;
        tracing::debug!(%url, "deleting namespace");
        self.execute::<serde_json::Value>(self.http.delete(url).query(&self.user_query()))
            .await?;
        Ok(())
    }

    async fn list_documents(&self, namespace_id: &str) -> Result<Vec<DocumentQueryResponse>, ApiError> {
        let url = documents_endpoint(&self.config.base_url, namespace_id)?;
        tracing::debug!(%url, "listing documents");
        let data = self.execute(self.http.get(url).query(&self.user_query())).await?;
        Ok(data.unwrap_or_default())
    }

    async fn upload_document(&self, namespace_id: &str, file: &PendingFile) -> Result<DocumentUploadResponse, ApiError> {
        let url = documents_endpoint(&self.config.base_url, namespace_id)?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let form = Form::new()
            .text("userId", self.config.user_id.clone())
            .part("file", part)
            .text("namespaceId", namespace_id.to_owned());
        tracing::debug!(%url, file = %file.name, size = file.size, "uploading document");
        expect_data(self.execute(self.http.post(url).multipart(form)).await?)
    }
}
