use std::sync::Arc;

use super::*;
use crate::api::rag::RagClient;
use crate::model::test_helpers::{doc, vault};
use crate::notify::{RecordingNotifier, ToastLevel};

fn seeded() -> (VaultStore, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = VaultStore::from_parts(
        vec![vault("a", "기본 문서함"), vault("b", "빈 보관함")],
        vec![
            doc("1", "a", "기술_사양서.pdf", "시스템 요구사항: 최소 8GB RAM. 요구사항 요구사항"),
            doc("2", "a", "제품_가이드.pdf", "제품 소개"),
        ],
        Vec::new(),
        notifier.clone(),
    );
    (store, notifier)
}

#[test]
fn title_truncates_long_queries() {
    assert_eq!(session_title("짧은 질문"), "짧은 질문");
    let long: String = "가".repeat(31);
    assert_eq!(session_title(&long), format!("{}...", "가".repeat(30)));
    assert_eq!(session_title(&"a".repeat(30)), "a".repeat(30));
}

#[test]
fn greeting_names_vault_and_count() {
    let (store, _) = seeded();
    assert_eq!(greeting(&store), "\"기본 문서함\" 보관함의 문서에 대해 질문해주세요. 2개의 문서가 준비되어 있습니다.");
    let empty = VaultStore::new(Arc::new(RecordingNotifier::new()));
    assert_eq!(greeting(&empty), "문서 보관함을 선택하고 질문해주세요.");
}

#[test]
fn new_panel_shows_greeting_only() {
    let (store, _) = seeded();
    let panel = ChatPanel::new(&store);
    assert_eq!(panel.messages().len(), 1);
    assert!(panel.is_fresh());
}

#[test]
fn first_question_creates_titled_session() {
    let (mut store, _) = seeded();
    let mut panel = ChatPanel::new(&store);

    let reply = panel.ask(&mut store, "시스템 요구사항이 무엇인가요?").unwrap();

    assert_eq!(store.sessions().len(), 1);
    assert_eq!(store.sessions()[0].title, "시스템 요구사항이 무엇인가요?");
    assert_eq!(store.sessions()[0].vault_id, "a");
    assert_eq!(panel.session_id(), store.selected_session_id());
    assert_eq!(reply.confidence, Some(88));
    assert!(reply.content.contains("8GB RAM"));
    let sources = reply.sources.unwrap();
    assert_eq!(sources[0].document_name, "기술_사양서.pdf");
    assert_eq!(panel.messages().len(), 3);
    assert!(!panel.is_fresh());
}

#[test]
fn follow_up_reuses_session() {
    let (mut store, _) = seeded();
    let mut panel = ChatPanel::new(&store);
    panel.ask(&mut store, "기능").unwrap();
    panel.ask(&mut store, "요약").unwrap();
    assert_eq!(store.sessions().len(), 1);
    assert_eq!(panel.messages().len(), 5);
}

#[test]
fn blank_query_is_rejected_silently() {
    let (mut store, notifier) = seeded();
    let mut panel = ChatPanel::new(&store);
    assert!(matches!(panel.ask(&mut store, "   "), Err(ChatError::EmptyQuery)));
    assert!(store.sessions().is_empty());
    assert!(notifier.drain().is_empty());
}

#[test]
fn no_vault_toasts() {
    let notifier = Arc::new(RecordingNotifier::new());
    let mut store = VaultStore::new(notifier.clone());
    let mut panel = ChatPanel::new(&store);
    assert!(matches!(panel.ask(&mut store, "질문"), Err(ChatError::NoVaultSelected)));
    assert_eq!(notifier.of_level(ToastLevel::Error).len(), 1);
}

#[test]
fn unmatched_query_in_empty_vault_is_not_found() {
    let (mut store, _) = seeded();
    store.select_vault("b").unwrap();
    let mut panel = ChatPanel::new(&store);
    let reply = panel.ask(&mut store, "날씨 어때").unwrap();
    assert_eq!(reply.confidence, Some(45));
    assert!(reply.sources.is_none());
}

#[test]
fn switching_vault_resets_messages() {
    let (mut store, _) = seeded();
    let mut panel = ChatPanel::new(&store);
    panel.ask(&mut store, "기능").unwrap();

    store.select_vault("b").unwrap();
    panel.sync(&store);

    assert_eq!(panel.session_id(), None);
    assert_eq!(panel.messages().len(), 1);
    assert!(panel.messages()[0].content.contains("빈 보관함"));
}

#[test]
fn opening_existing_session_starts_empty() {
    let (mut store, _) = seeded();
    let session = store.create_session("a", "이전 대화").unwrap();
    store.select_session(None).unwrap();
    let mut panel = ChatPanel::new(&store);

    store.select_session(Some(&session.id)).unwrap();
    panel.sync(&store);

    assert!(panel.messages().is_empty());
    panel.ask(&mut store, "사용 방법").unwrap();
    assert_eq!(store.sessions().len(), 1);
}

#[tokio::test]
async fn failed_remote_answer_leaves_no_session() {
    let (mut store, notifier) = seeded();
    let mut panel = ChatPanel::new(&store);
    let rag = RagClient::new("http://127.0.0.1:1").unwrap();

    let err = panel.ask_remote(&mut store, &rag, "질문입니다").await.unwrap_err();

    assert!(matches!(err, ChatError::Api(_)));
    assert!(store.sessions().is_empty());
    assert_eq!(store.selected_session_id(), None);
    assert_eq!(panel.messages().len(), 1);
    assert!(panel.is_fresh());
    assert_eq!(notifier.of_level(ToastLevel::Error).len(), 1);
}
