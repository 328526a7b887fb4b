//! # NLU Pipeline: Understanding the Question
//!
//! The [`NluPipeline`] turns raw question text into a [`Question`]: the
//! routed [`Intent`] plus the [`QuestionParams`] the handlers read.
//!
//! ## Processing Flow
//!
//! ```text
//! raw question
//!   ├── 1. NFKC normalize, fold dash variants (– — ‑) to "-"
//!   ├── 2. lower-case copy
//!   ├── 3. classify intent (IntentClassifier, ordered rules)
//!   └── 4. extract parameters (ParamExtractor)
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`intent`] | Ordered-rule intent classification |
//! | [`extractor`] | Counts, years, markets, channels, packs, segments, metric |

pub mod extractor;
pub mod intent;

use unicode_normalization::UnicodeNormalization;

pub use extractor::{ParamExtractor, QuestionParams};
pub use intent::{Intent, IntentClassifier};

/// A question after analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    /// Normalized text, original casing.
    pub text: String,
    /// Normalized, lower-cased text.
    pub lower: String,
    pub intent: Intent,
    pub params: QuestionParams,
}

/// Unicode-normalizes (NFKC) and folds dash variants to ASCII `-`, so that
/// "18–34" and "18-34" read the same. Trims surrounding whitespace.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Classifier plus extractor. Immutable after creation, so one instance
/// serves every request.
pub struct NluPipeline {
    classifier: IntentClassifier,
    extractor: ParamExtractor,
}

impl NluPipeline {
    pub fn new() -> Self {
        Self {
            classifier: IntentClassifier::new(),
            extractor: ParamExtractor::new(),
        }
    }

    /// Classifies only.
    pub fn classify(&self, text: &str) -> Intent {
        self.classifier.classify(text)
    }

    /// Full analysis: normalization, intent and parameters.
    pub fn analyze(&self, raw: &str) -> Question {
        let text = normalize(raw);
        let lower = text.to_lowercase();
        let intent = self.classifier.classify_normalized(&lower);
        let params = self.extractor.extract(&text, &lower);
        Question {
            text,
            lower,
            intent,
            params,
        }
    }
}

impl Default for NluPipeline {
    fn default() -> Self {
        Self::new()
    }
}
