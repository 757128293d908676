//! Wire DTOs for the namespace/document API and envelope unwrapping.
//!
//! DESIGN
//! ======
//! The server speaks camelCase JSON wrapped in `{success, data, message}`.
//! Ids arrive as JSON numbers but are opaque strings client-side, and
//! timestamps arrive either as RFC 3339 or as offset-less ISO-8601 (which
//! are taken as UTC). The deserializers here absorb both.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use super::ApiError;
use crate::model::{Document, Vault};

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<ErrorInfo>,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageOnly {
    message: Option<String>,
    error: Option<ErrorInfo>,
}

impl MessageOnly {
    fn into_message(self) -> Option<String> {
        self.message.or_else(|| self.error.and_then(|e| e.message))
    }
}

/// Unwrap an API envelope.
///
/// A non-2xx status becomes [`ApiError::Status`] carrying the server message
/// when the body has one, else `status_text`. `success: false` becomes
/// [`ApiError::Rejected`]. `data` may legitimately be `null`.
///
/// # Errors
///
/// Returns an error for failed statuses, rejected envelopes, or bodies that
/// do not parse.
pub fn parse_envelope<T: DeserializeOwned>(status: u16, status_text: &str, body: &str) -> Result<Option<T>, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<MessageOnly>(body)
            .ok()
            .and_then(MessageOnly::into_message)
            .unwrap_or_else(|| status_text.to_owned());
        return Err(ApiError::Status { status, message });
    }

    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    if !envelope.success {
        let message = envelope
            .message
            .or_else(|| envelope.error.and_then(|e| e.message))
            .unwrap_or_else(|| "request failed".to_owned());
        return Err(ApiError::Rejected(message));
    }
    Ok(envelope.data)
}

/// Require a non-null `data` payload.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when `data` was `null` or absent.
pub fn expect_data<T>(data: Option<T>) -> Result<T, ApiError> {
    data.ok_or_else(|| ApiError::Parse("missing data in response".to_owned()))
}

// =============================================================================
// NAMESPACES
// =============================================================================

/// A namespace as returned by create/list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceResponse {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp", serialize_with = "time::serde::rfc3339::serialize")]
    pub created_at: OffsetDateTime,
}

impl NamespaceResponse {
    #[must_use]
    pub fn into_vault(self, document_count: usize) -> Vault {
        Vault {
            id: self.id,
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            created_at: self.created_at,
            document_count,
        }
    }
}

/// A namespace with its server-side document total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceWithTotalCnt {
    pub namespace: NamespaceResponse,
    #[serde(default)]
    pub document_total_cnt: u64,
}

impl From<NamespaceWithTotalCnt> for Vault {
    fn from(value: NamespaceWithTotalCnt) -> Self {
        let count = usize::try_from(value.document_total_cnt).unwrap_or(usize::MAX);
        value.namespace.into_vault(count)
    }
}

/// Body of `POST /namespaces`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespaceRequest<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A document row from `GET /namespaces/{id}/documents`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQueryResponse {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(deserialize_with = "deserialize_timestamp", serialize_with = "time::serde::rfc3339::serialize")]
    pub uploaded_at: OffsetDateTime,
    #[serde(deserialize_with = "deserialize_id")]
    pub vault_id: String,
}

impl From<DocumentQueryResponse> for Document {
    fn from(value: DocumentQueryResponse) -> Self {
        Document {
            id: value.id,
            name: value.name,
            mime_type: value.mime_type,
            size: value.size,
            uploaded_at: value.uploaded_at,
            vault_id: value.vault_id,
            content: None,
        }
    }
}

/// Result of `POST /namespaces/{id}/documents`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadResponse {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub file_name: String,
    #[serde(deserialize_with = "deserialize_timestamp", serialize_with = "time::serde::rfc3339::serialize")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// LENIENT DESERIALIZERS
// =============================================================================

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
}

/// Parse RFC 3339, or an offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;

    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let with_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let whole_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(raw, whole_seconds))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
