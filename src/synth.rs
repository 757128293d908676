//! Canned answer synthesizer.
//!
//! DESIGN
//! ======
//! An ordered decision table, not a generative model. The lower-cased query
//! is tested against `RULES` top to bottom and the first rule with any
//! matching keyword produces the reply. When no rule matches, the presence
//! of scored sources picks between the "related documents" and "not found"
//! fallbacks.
//!
//! This table stands in for a real retrieval + LLM backend; see
//! [`crate::api::rag`] for the client of the prototype answer endpoint.

#[cfg(test)]
#[path = "synth_test.rs"]
mod synth_test;

use crate::retrieval::ScoredDocument;

/// Synthesized assistant answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Confidence percentage in `0..=100`.
    pub confidence: u8,
}

/// Which rule produced a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Summary,
    Requirements,
    Features,
    HowTo,
    Related,
    NotFound,
}

struct Rule {
    intent: Intent,
    keywords: &'static [&'static str],
    template: &'static str,
    /// Confidence when sources were found / when none were.
    confidence: (u8, u8),
}

const SUMMARY_TEMPLATE: &str = "업로드된 문서들을 분석한 결과, 다음과 같은 주요 내용을 확인했습니다:\n\n\
1. 최신 AI 기술을 활용한 RAG 솔루션\n\
2. 자동 문서 분석 및 지능형 검색 기능\n\
3. 실시간 답변 생성 시스템\n\n\
각 문서에서 추출한 핵심 정보를 바탕으로 답변을 구성했습니다.";

const REQUIREMENTS_TEMPLATE: &str = "시스템 요구사항은 다음과 같습니다:\n\n\
• 최소 8GB RAM\n\
• 듀얼코어 프로세서\n\
• 지원 OS: Windows 10 이상, macOS 11 이상, Ubuntu 20.04 이상\n\
• API는 REST 기반이며 JSON 형식 사용\n\n\
기술 사양서 문서에서 확인된 정보입니다.";

const FEATURES_TEMPLATE: &str = "주요 기능은 다음과 같습니다:\n\n\
1. 자동 문서 분석: 업로드된 문서를 AI가 자동으로 분석\n\
2. 지능형 검색: RAG 기술로 정확한 정보 검색\n\
3. 실시간 답변 생성: 질문에 대한 즉각적인 답변 제공\n\
4. 다양한 파일 형식 지원: PDF, DOCX, TXT 등\n\n\
각 기능은 최신 AI 기술로 구현되었습니다.";

const HOWTO_TEMPLATE: &str = "시작하는 방법:\n\n\
1. 문서 보관함을 선택하거나 새로 생성합니다\n\
2. 보관함에 문서를 업로드합니다\n\
3. 채팅창에서 문서 내용에 대해 질문합니다\n\n\
시스템이 자동으로 관련 문서를 찾아 정확한 답변을 생성합니다.";

const NOT_FOUND_TEMPLATE: &str = "죄송합니다. 현재 보관함의 문서에서 관련 정보를 찾을 수 없습니다.\n\n\
다음을 시도해보세요:\n\
• 질문을 다르게 표현해보세요\n\
• 관련 문서를 보관함에 추가해보세요\n\
• 다른 보관함을 선택해보세요";

const RELATED_CONFIDENCE: u8 = 78;
const NOT_FOUND_CONFIDENCE: u8 = 45;

// Order is precedence.
const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Summary,
        keywords: &["요약", "주요", "내용"],
        template: SUMMARY_TEMPLATE,
        confidence: (92, 75),
    },
    Rule {
        intent: Intent::Requirements,
        keywords: &["요구사항", "시스템"],
        template: REQUIREMENTS_TEMPLATE,
        confidence: (88, 88),
    },
    Rule {
        intent: Intent::Features,
        keywords: &["기능", "특징"],
        template: FEATURES_TEMPLATE,
        confidence: (90, 90),
    },
    Rule {
        intent: Intent::HowTo,
        keywords: &["사용", "방법", "시작"],
        template: HOWTO_TEMPLATE,
        confidence: (94, 94),
    },
];

/// Classify a query by the first matching rule.
#[must_use]
pub fn classify(query: &str, has_sources: bool) -> Intent {
    let lowered = query.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(if has_sources { Intent::Related } else { Intent::NotFound }, |rule| rule.intent)
}

/// Produce the canned reply for `query` given the scored sources.
#[must_use]
pub fn synthesize(query: &str, sources: &[ScoredDocument]) -> Reply {
    let has_sources = !sources.is_empty();
    let intent = classify(query, has_sources);
    if let Some(rule) = RULES.iter().find(|rule| rule.intent == intent) {
        let confidence = if has_sources { rule.confidence.0 } else { rule.confidence.1 };
        return Reply { content: rule.template.to_owned(), confidence };
    }
    match intent {
        Intent::Related => Reply { content: related_template(sources.len()), confidence: RELATED_CONFIDENCE },
        _ => Reply { content: NOT_FOUND_TEMPLATE.to_owned(), confidence: NOT_FOUND_CONFIDENCE },
    }
}

fn related_template(count: usize) -> String {
    format!(
        "질문하신 내용과 관련하여 {count}개의 문서에서 정보를 찾았습니다.\n\n\
문서들을 분석한 결과, 귀하의 질문과 관련된 내용이 포함되어 있습니다. \
더 구체적인 질문을 해주시면 더 정확한 답변을 드릴 수 있습니다.\n\n\
아래 참고 문서의 관련 내용을 확인해보세요."
    )
}

// =============================================================================
// CONFIDENCE BANDS
// =============================================================================

/// Display band for a confidence percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Fair,
    Low,
}

impl ConfidenceBand {
    #[must_use]
    pub fn of(confidence: u8) -> Self {
        match confidence {
            85.. => Self::High,
            70..=84 => Self::Medium,
            50..=69 => Self::Fair,
            _ => Self::Low,
        }
    }

    /// User-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "높음",
            Self::Medium => "중간",
            Self::Fair => "보통",
            Self::Low => "낮음",
        }
    }
}
