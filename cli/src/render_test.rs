use super::*;
use docvault::model::Source;

#[test]
fn toast_prefixes() {
    let toast = Toast { level: ToastLevel::Warning, message: "조심".into() };
    assert_eq!(render_toast(&toast), "[warn] 조심");
}

#[test]
fn assistant_message_shows_confidence_and_sources() {
    let message = Message::assistant(
        "답변",
        vec![Source { document_name: "a.pdf".into(), excerpt: "본문...".into(), relevance: 70 }],
        Some(88),
    );
    let text = render_message(&message);
    assert!(text.starts_with("AI> 답변\n"));
    assert!(text.contains("신뢰도: 88% (높음)"));
    assert!(text.contains("- a.pdf (70%): 본문..."));
}

#[test]
fn user_message_is_one_line() {
    assert_eq!(render_message(&Message::user("질문")), "나> 질문\n");
}

#[test]
fn samples_are_numbered_from_one() {
    assert!(render_samples().contains("  1. 이 문서의 주요 내용을 요약해주세요"));
    assert_eq!(sample_by_number("2"), Some("시스템 요구사항이 무엇인가요?"));
    assert_eq!(sample_by_number("0"), None);
    assert_eq!(sample_by_number("5"), None);
    assert_eq!(sample_by_number("abc"), None);
}
