//! Client for the prototype RAG service.
//!
//! Two calls, neither wrapped in the namespace API envelope: a question
//! endpoint answering `{answer}` (or `{error}`), and a bulk file ingest
//! endpoint answering with an optional `message`.

#[cfg(test)]
#[path = "rag_test.rs"]
mod rag_test;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::upload::PendingFile;

/// Fallback when the service answers 2xx without an `answer`.
pub const NO_ANSWER: &str = "답변을 받을 수 없습니다.";

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RagReply {
    answer: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

fn ask_endpoint(base_url: &str) -> String {
    format!("{}/api/rag", base_url.trim_end_matches('/'))
}

fn uploads_endpoint(base_url: &str) -> String {
    format!("{}/backend-api/files/uploads", base_url.trim_end_matches('/'))
}

/// Interpret a `/api/rag` response body.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx statuses (carrying `error` when
/// present) and [`ApiError::Parse`] for bodies that are not JSON.
pub fn parse_answer(status: u16, status_text: &str, body: &str) -> Result<String, ApiError> {
    let reply: Result<RagReply, ApiError> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()));
    if !(200..300).contains(&status) {
        let message = reply
            .ok()
            .and_then(|r| r.error.or(r.message))
            .unwrap_or_else(|| status_text.to_owned());
        return Err(ApiError::Status { status, message });
    }
    Ok(reply?.answer.unwrap_or_else(|| NO_ANSWER.to_owned()))
}

/// Interpret a `/backend-api/files/uploads` response body.
///
/// An empty or non-JSON 2xx body is still a success with no message.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx statuses.
pub fn parse_upload(status: u16, status_text: &str, body: &str) -> Result<Option<String>, ApiError> {
    let reply = serde_json::from_str::<RagReply>(body).unwrap_or_default();
    if !(200..300).contains(&status) {
        let message = reply.message.or(reply.error).unwrap_or_else(|| status_text.to_owned());
        return Err(ApiError::Status { status, message });
    }
    Ok(reply.message)
}

pub struct RagClient {
    http: reqwest::Client,
    base_url: String,
}

impl RagClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<(u16, &'static str, String), ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "rag response");
        Ok((status.as_u16(), status.canonical_reason().unwrap_or("unknown status"), text))
    }

    /// Ask a free-form question.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service reports one.
    pub async fn ask(&self, question: &str) -> Result<String, ApiError> {
        let url = ask_endpoint(&self.base_url);
        tracing::info!(%url, chars = question.chars().count(), "rag question");
        let (status, reason, body) = Self::send(self.http.post(url).json(&AskRequest { question })).await?;
        parse_answer(status, reason, &body)
    }

    /// Send files for ingestion in a single multipart request.
    ///
    /// # Errors
    ///
    /// Returns an error if the form cannot be built, the request fails, or
    /// the service answers with a failure status.
    pub async fn upload_files(&self, files: &[PendingFile]) -> Result<Option<String>, ApiError> {
        let url = uploads_endpoint(&self.base_url);
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
            form = form.part("files", part);
        }
        tracing::info!(%url, files = files.len(), "rag upload");
        let (status, reason, body) = Self::send(self.http.post(url).multipart(form)).await?;
        parse_upload(status, reason, &body)
    }
}
