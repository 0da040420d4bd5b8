pub mod classifier;
pub mod entities;
pub mod language;
pub mod responder;
pub mod templates;

use std::sync::Arc;

use serde::Serialize;

use crate::models::{Intent, KnowledgeBase, Language, LanguageHint, PatternTable};

pub use classifier::IntentClassifier;
pub use language::detect_language;
pub use responder::Responder;

/// Lower-case and trim. Diacritics and punctuation are kept.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Outcome of one classify-then-respond pass.
#[derive(Debug, Clone, Serialize)]
pub struct NluReply {
    pub intent: Intent,
    pub response: String,
}

/// Read-only context shared by every request. Built once at startup and
/// handed out behind an `Arc`.
#[derive(Debug, Clone)]
pub struct NluEngine {
    kb: Arc<KnowledgeBase>,
    patterns: Arc<PatternTable>,
}

impl NluEngine {
    pub fn new(kb: Arc<KnowledgeBase>, patterns: Arc<PatternTable>) -> Self {
        Self { kb, patterns }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn classify(&self, text: &str, hint: LanguageHint) -> Intent {
        let normalized = normalize(text);
        let language = match hint {
            LanguageHint::Fixed(language) => language,
            LanguageHint::Auto => detect_language(&normalized),
        };
        IntentClassifier::new(&self.patterns).classify(&normalized, language)
    }

    pub fn respond(&self, intent: Option<&Intent>, language: Language) -> String {
        Responder::new(&self.kb, &self.patterns).respond(intent, language)
    }

    /// Classifies `text` and answers in the language the intent carries.
    pub fn process(&self, text: &str, hint: LanguageHint) -> NluReply {
        let intent = self.classify(text, hint);
        let response = self.respond(Some(&intent), intent.language);
        tracing::info!(
            intent = intent.kind.as_str(),
            confidence = intent.confidence,
            language = intent.language.as_str(),
            "processed message"
        );
        NluReply { intent, response }
    }
}
