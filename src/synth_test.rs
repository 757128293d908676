use super::*;
use crate::model::test_helpers::doc;
use crate::retrieval::score;

fn some_sources() -> Vec<ScoredDocument> {
    score("요구사항", &[doc("1", "v", "사양서.txt", "시스템 요구사항: 최소 8GB RAM")])
}

// =============================================================
// rule precedence
// =============================================================

#[test]
fn requirements_question_is_88_and_mentions_ram() {
    let reply = synthesize("시스템 요구사항이 무엇인가요?", &some_sources());
    assert_eq!(reply.confidence, 88);
    assert!(reply.content.contains("8GB RAM"));
}

#[test]
fn summary_confidence_depends_on_sources() {
    assert_eq!(synthesize("주요 내용을 요약해주세요", &some_sources()).confidence, 92);
    assert_eq!(synthesize("주요 내용을 요약해주세요", &[]).confidence, 75);
}

#[test]
fn summary_wins_over_requirements() {
    // Contains both "내용" and "시스템"; summary is listed first.
    assert_eq!(classify("시스템 내용", false), Intent::Summary);
}

#[test]
fn features_and_howto_constants() {
    let features = synthesize("어떤 기능들이 있나요?", &[]);
    assert_eq!(features.confidence, 90);
    assert!(features.content.contains("PDF, DOCX, TXT"));
    let howto = synthesize("사용 방법을 알려주세요", &[]);
    assert_eq!(howto.confidence, 94);
    assert!(howto.content.starts_with("시작하는 방법"));
}

#[test]
fn fallback_with_sources_reports_count() {
    let sources = some_sources();
    let reply = synthesize("8gb ram?", &sources);
    assert_eq!(reply.confidence, 78);
    assert!(reply.content.contains("1개의 문서"));
}

#[test]
fn fallback_without_sources_is_not_found() {
    let reply = synthesize("hello", &[]);
    assert_eq!(reply.confidence, 45);
    assert!(reply.content.starts_with("죄송합니다"));
    assert_eq!(classify("hello", false), Intent::NotFound);
}

#[test]
fn matching_is_case_insensitive() {
    // No rule keywords are ASCII, but lower-casing must not break Hangul.
    assert_eq!(classify("SYSTEM 시스템", false), Intent::Requirements);
}

// =============================================================
// confidence bands
// =============================================================

#[test]
fn confidence_band_boundaries() {
    assert_eq!(ConfidenceBand::of(100), ConfidenceBand::High);
    assert_eq!(ConfidenceBand::of(85), ConfidenceBand::High);
    assert_eq!(ConfidenceBand::of(84), ConfidenceBand::Medium);
    assert_eq!(ConfidenceBand::of(70), ConfidenceBand::Medium);
    assert_eq!(ConfidenceBand::of(69), ConfidenceBand::Fair);
    assert_eq!(ConfidenceBand::of(50), ConfidenceBand::Fair);
    assert_eq!(ConfidenceBand::of(45), ConfidenceBand::Low);
    assert_eq!(ConfidenceBand::of(45).label(), "낮음");
}
