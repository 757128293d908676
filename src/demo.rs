//! Offline seed data: two vaults, three documents, three past sessions.

#[cfg(test)]
#[path = "demo_test.rs"]
mod demo_test;

use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::datetime;

use crate::api::memory::MemoryApi;
use crate::model::{ChatSession, Document, Vault};
use crate::notify::Notifier;
use crate::store::VaultStore;
use crate::upload::{MIME_DOCX, MIME_PDF};

fn vault(id: &str, name: &str, description: &str, created_at: OffsetDateTime) -> Vault {
    Vault {
        id: id.to_owned(),
        name: name.to_owned(),
        description: Some(description.to_owned()),
        created_at,
        document_count: 0,
    }
}

fn document(id: &str, vault_id: &str, name: &str, mime_type: &str, size: u64, uploaded_at: OffsetDateTime, content: &str) -> Document {
    Document {
        id: id.to_owned(),
        name: name.to_owned(),
        mime_type: mime_type.to_owned(),
        size,
        uploaded_at,
        vault_id: vault_id.to_owned(),
        content: Some(content.to_owned()),
    }
}

fn session(id: &str, vault_id: &str, title: &str, at: OffsetDateTime) -> ChatSession {
    ChatSession {
        id: id.to_owned(),
        title: title.to_owned(),
        vault_id: vault_id.to_owned(),
        created_at: at,
        last_message_at: at,
    }
}

#[must_use]
pub fn vaults() -> Vec<Vault> {
    vec![
        vault("1", "기본 문서함", "기본 문서 보관함", datetime!(2025-10-15 00:00 UTC)),
        vault("2", "사용자 가이드", "사용자 매뉴얼 및 FAQ", datetime!(2025-10-20 00:00 UTC)),
    ]
}

#[must_use]
pub fn documents() -> Vec<Document> {
    vec![
        document(
            "1",
            "1",
            "제품_가이드.pdf",
            MIME_PDF,
            2_048_000,
            datetime!(2025-10-20 00:00 UTC),
            "이 제품은 최신 AI 기술을 활용한 솔루션입니다. 주요 기능으로는 자동 문서 분석, 지능형 검색, \
실시간 답변 생성이 있습니다. RAG(Retrieval-Augmented Generation) 기술을 사용하여 정확도를 높였습니다.",
        ),
        document(
            "2",
            "1",
            "기술_사양서.pdf",
            MIME_PDF,
            3_072_000,
            datetime!(2025-10-22 00:00 UTC),
            "시스템 요구사항: 최소 8GB RAM, 듀얼코어 프로세서. 지원 OS: Windows 10 이상, macOS 11 이상, \
Ubuntu 20.04 이상. API는 REST 기반이며 JSON 형식을 사용합니다.",
        ),
        document(
            "3",
            "2",
            "사용자_매뉴얼.docx",
            MIME_DOCX,
            1_536_000,
            datetime!(2025-10-25 00:00 UTC),
            "시작하기: 1. 문서 보관함을 선택하거나 생성합니다. 2. 문서를 업로드합니다. 3. 채팅창에서 질문합니다. \
시스템이 자동으로 관련 문서를 찾아 답변을 생성합니다.",
        ),
    ]
}

#[must_use]
pub fn sessions() -> Vec<ChatSession> {
    vec![
        session("1", "1", "제품 기능에 대한 질문", datetime!(2025-10-26 00:00 UTC)),
        session("2", "1", "시스템 요구사항 문의", datetime!(2025-10-27 00:00 UTC)),
        session("3", "2", "사용 방법 안내", datetime!(2025-10-28 00:00 UTC)),
    ]
}

/// Store seeded with the demo collections, vault "1" and session "1" open.
#[must_use]
pub fn seed_store(notifier: Arc<dyn Notifier>) -> VaultStore {
    let mut store = VaultStore::from_parts(vaults(), documents(), sessions(), notifier);
    if let Err(e) = store.select_session(Some("1")) {
        tracing::warn!(error = %e, "demo session missing");
    }
    store
}

/// In-memory backend holding the same collections as [`seed_store`].
#[must_use]
pub fn seed_api() -> MemoryApi {
    MemoryApi::mirroring(&vaults(), &documents())
}
