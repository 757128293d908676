//! Plain-text rendering for chat output and toasts.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use docvault::chat::SAMPLE_QUESTIONS;
use docvault::model::{Message, Role};
use docvault::notify::{Notifier, Toast, ToastLevel};
use docvault::synth::ConfidenceBand;

/// Prints toasts to stderr with a level prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, message = %toast.message, "toast");
        eprintln!("{}", render_toast(&toast));
    }
}

#[must_use]
pub fn render_toast(toast: &Toast) -> String {
    let prefix = match toast.level {
        ToastLevel::Info => "[info]",
        ToastLevel::Success => "[ok]",
        ToastLevel::Warning => "[warn]",
        ToastLevel::Error => "[error]",
    };
    format!("{prefix} {}", toast.message)
}

/// One chat message with its confidence line and citations.
#[must_use]
pub fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "나",
        Role::Assistant => "AI",
    };
    let mut out = format!("{speaker}> {}\n", message.content);
    if let Some(confidence) = message.confidence {
        let band = ConfidenceBand::of(confidence);
        let _ = writeln!(out, "  신뢰도: {confidence}% ({})", band.label());
    }
    if let Some(sources) = &message.sources {
        let _ = writeln!(out, "  참고 문서:");
        for source in sources {
            let _ = writeln!(out, "    - {} ({}%): {}", source.document_name, source.relevance, source.excerpt);
        }
    }
    out
}

#[must_use]
pub fn render_samples() -> String {
    let mut out = String::from("예시 질문:\n");
    for (index, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        let _ = writeln!(out, "  {}. {question}", index + 1);
    }
    out
}

/// A sample question picked by its 1-based number.
#[must_use]
pub fn sample_by_number(input: &str) -> Option<&'static str> {
    let n: usize = input.trim().parse().ok()?;
    n.checked_sub(1).and_then(|i| SAMPLE_QUESTIONS.get(i)).copied()
}
