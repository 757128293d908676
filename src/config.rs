//! Client configuration parsed from environment variables.

use crate::api::http::ApiConfig;
use crate::upload::{PolicyKind, UploadPolicy};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api/v1";
pub const DEFAULT_RAG_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_USER_ID: &str = "1";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub rag_base_url: String,
    pub user_id: String,
    pub upload_policy: PolicyKind,
    pub max_upload_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            rag_base_url: DEFAULT_RAG_BASE_URL.to_owned(),
            user_id: DEFAULT_USER_ID.to_owned(),
            upload_policy: PolicyKind::Standard,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DOCVAULT_API_BASE_URL`: namespace/document API root
    /// - `DOCVAULT_RAG_BASE_URL`: prototype RAG service root
    /// - `DOCVAULT_USER_ID`: user id sent with every API call
    /// - `DOCVAULT_UPLOAD_POLICY`: `standard` (default) or `pdf_only`
    /// - `DOCVAULT_MAX_UPLOAD_BYTES`: default 10 MiB
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown upload policy or a non-numeric size.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = trim_url(std::env::var("DOCVAULT_API_BASE_URL").ok(), DEFAULT_API_BASE_URL);
        let rag_base_url = trim_url(std::env::var("DOCVAULT_RAG_BASE_URL").ok(), DEFAULT_RAG_BASE_URL);
        let user_id = std::env::var("DOCVAULT_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_owned());
        let upload_policy = parse_policy(std::env::var("DOCVAULT_UPLOAD_POLICY").ok().as_deref())?;
        let max_upload_bytes = match std::env::var("DOCVAULT_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Parse(format!("invalid DOCVAULT_MAX_UPLOAD_BYTES: {raw}")))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self { api_base_url, rag_base_url, user_id, upload_policy, max_upload_bytes })
    }

    /// Connection settings for the namespace/document API.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig { base_url: self.api_base_url.clone(), user_id: self.user_id.clone() }
    }

    /// Upload validation rules for this deployment.
    #[must_use]
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::from_kind(self.upload_policy, self.max_upload_bytes)
    }
}

fn trim_url(raw: Option<String>, default: &str) -> String {
    raw.unwrap_or_else(|| default.to_owned())
        .trim_end_matches('/')
        .to_owned()
}

/// Parse an upload policy name.
///
/// # Errors
///
/// Returns an error for names other than `standard` and `pdf_only`.
pub fn parse_policy(raw: Option<&str>) -> Result<PolicyKind, ConfigError> {
    match raw.unwrap_or("standard") {
        "standard" => Ok(PolicyKind::Standard),
        "pdf_only" => Ok(PolicyKind::PdfOnly),
        other => Err(ConfigError::Parse(format!("unknown DOCVAULT_UPLOAD_POLICY: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
