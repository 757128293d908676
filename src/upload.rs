//! File staging and sequential batch upload.
//!
//! DESIGN
//! ======
//! Validation happens at staging time against an [`UploadPolicy`]; only
//! accepted files ever reach the queue. [`UploadQueue::submit`] walks the
//! queue one file at a time against any [`VaultApi`], so a batch against the
//! HTTP client and one against the in-memory backend behave identically.
//!
//! ERROR HANDLING
//! ==============
//! A failed file is toasted and skipped; the rest of the batch continues.
//! The caller receives only the documents that made it and applies them to
//! the store in one step.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use std::path::Path;

use crate::api::VaultApi;
use crate::model::Document;
use crate::notify::Notifier;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TXT: &str = "text/plain";

const REJECTED_TOAST: &str = "일부 파일이 지원되지 않거나 크기가 10MB를 초과합니다";
const EMPTY_QUEUE_TOAST: &str = "업로드할 파일을 선택하세요";

/// Errors produced while staging or submitting uploads.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported file type: {name} ({mime_type})")]
    Unsupported { name: String, mime_type: String },

    #[error("file too large: {name} is {size} bytes (max {max})")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("no files queued for upload")]
    EmptyQueue,

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

// =============================================================================
// POLICY
// =============================================================================

/// Named policy presets, selectable through configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolicyKind {
    /// PDF, DOCX and plain text.
    #[default]
    Standard,
    PdfOnly,
}

/// Allow-list plus per-file size ceiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl UploadPolicy {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            mime_types: vec![MIME_PDF.into(), MIME_DOCX.into(), MIME_TXT.into()],
            extensions: vec!["pdf".into(), "docx".into(), "txt".into()],
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }

    #[must_use]
    pub fn pdf_only() -> Self {
        Self { mime_types: vec![MIME_PDF.into()], extensions: vec!["pdf".into()], max_bytes: MAX_UPLOAD_BYTES }
    }

    #[must_use]
    pub fn from_kind(kind: PolicyKind, max_bytes: u64) -> Self {
        let base = match kind {
            PolicyKind::Standard => Self::standard(),
            PolicyKind::PdfOnly => Self::pdf_only(),
        };
        Self { max_bytes, ..base }
    }

    /// Check one file against the allow-list and the size ceiling.
    ///
    /// A file passes the type check when either its MIME type or its
    /// extension is listed.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Unsupported`] or [`UploadError::TooLarge`].
    pub fn validate(&self, file: &PendingFile) -> Result<(), UploadError> {
        let mime_ok = self.mime_types.iter().any(|m| m == &file.mime_type);
        let ext_ok = extension(&file.name).is_some_and(|ext| self.extensions.iter().any(|e| *e == ext));
        if !mime_ok && !ext_ok {
            return Err(UploadError::Unsupported { name: file.name.clone(), mime_type: file.mime_type.clone() });
        }
        if file.size > self.max_bytes {
            return Err(UploadError::TooLarge { name: file.name.clone(), size: file.size, max: self.max_bytes });
        }
        Ok(())
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type for a file name, by extension.
#[must_use]
pub fn mime_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("pdf") => MIME_PDF,
        Some("docx") => MIME_DOCX,
        Some("txt" | "md") => MIME_TXT,
        _ => "application/octet-stream",
    }
}

// =============================================================================
// PENDING FILE
// =============================================================================

/// A file selected for upload, held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), size: bytes.len() as u64, bytes }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    /// The size is checked against `max_bytes` before any content is read.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooLarge`] for a file over `max_bytes`, or
    /// [`UploadError::Io`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let io_error = |e: std::io::Error| UploadError::Io { path: path.display().to_string(), message: e.to_string() };
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
        if size > max_bytes {
            return Err(UploadError::TooLarge { name, size, max: max_bytes });
        }
        let bytes = tokio::fs::read(path).await.map_err(io_error)?;
        let mime_type = mime_for(&name);
        Ok(Self::new(name, mime_type, bytes))
    }

    /// Text stored alongside the uploaded document for local scoring.
    ///
    /// Plain text carries its own content; other formats get a placeholder
    /// naming the file, since extraction happens server-side.
    #[must_use]
    pub fn local_content(&self) -> String {
        if self.mime_type == MIME_TXT {
            if let Ok(text) = std::str::from_utf8(&self.bytes) {
                return text.to_owned();
            }
        }
        format!(
            "이것은 {}의 샘플 내용입니다. 실제 환경에서는 파일 내용이 추출되어 RAG 시스템에 저장됩니다.",
            self.name
        )
    }
}

// =============================================================================
// QUEUE
// =============================================================================

/// Files staged for the next upload batch.
#[derive(Debug, Default)]
pub struct UploadQueue {
    policy: UploadPolicy,
    pending: Vec<PendingFile>,
}

impl UploadQueue {
    #[must_use]
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy, pending: Vec::new() }
    }

    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    #[must_use]
    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue every acceptable file. Emits one warning for the whole batch
    /// when anything was rejected, and returns the rejections.
    pub fn stage(&mut self, files: Vec<PendingFile>, notifier: &dyn Notifier) -> Vec<UploadError> {
        let mut rejected = Vec::new();
        for file in files {
            match self.policy.validate(&file) {
                Ok(()) => self.pending.push(file),
                Err(e) => {
                    tracing::debug!(error = %e, "file rejected at staging");
                    rejected.push(e);
                }
            }
        }
        if !rejected.is_empty() {
            notifier.warning(REJECTED_TOAST);
        }
        rejected
    }

    /// Drop one pending file. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<PendingFile> {
        (index < self.pending.len()).then(|| self.pending.remove(index))
    }

    /// Upload every pending file to `vault_id`, one at a time.
    ///
    /// `on_progress` receives 0 before the first file and the completed
    /// percentage after each one. The queue is cleared afterwards whatever
    /// the per-file outcomes were.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::EmptyQueue`] if nothing was staged.
    pub async fn submit(
        &mut self,
        api: &dyn VaultApi,
        vault_id: &str,
        notifier: &dyn Notifier,
        mut on_progress: impl FnMut(u8) + Send,
    ) -> Result<Vec<Document>, UploadError> {
        if self.pending.is_empty() {
            notifier.error(EMPTY_QUEUE_TOAST);
            return Err(UploadError::EmptyQueue);
        }

        let files = std::mem::take(&mut self.pending);
        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);
        on_progress(0);

        for (index, file) in files.iter().enumerate() {
            match api.upload_document(vault_id, file).await {
                Ok(resp) => {
                    tracing::info!(vault_id, document_id = %resp.id, file = %file.name, "document uploaded");
                    uploaded.push(Document {
                        id: resp.id,
                        name: file.name.clone(),
                        mime_type: file.mime_type.clone(),
                        size: file.size,
                        uploaded_at: resp.created_at,
                        vault_id: vault_id.to_owned(),
                        content: Some(file.local_content()),
                    });
                }
                Err(e) => {
                    tracing::warn!(vault_id, file = %file.name, error = %e, "document upload failed");
                    notifier.error(&format!("{} 업로드 실패: {}", file.name, e.user_message()));
                }
            }
            on_progress(percent(index + 1, total));
        }

        if !uploaded.is_empty() {
            notifier.success(&format!("{}개의 문서가 업로드되었습니다", uploaded.len()));
        }
        Ok(uploaded)
    }
}

fn percent(done: usize, total: usize) -> u8 {
    u8::try_from(done * 100 / total.max(1)).unwrap_or(100)
}
