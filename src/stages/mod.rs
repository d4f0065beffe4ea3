//! Stage collaborator interfaces.
//!
//! The orchestrator only ever talks to these traits. Linguistic quality
//! lives behind them: the rule-based implementations in this module tree
//! are deterministic references, and every trait has a mock for testing
//! the orchestration without real models.

pub mod cleaner;
pub mod extractor;
pub mod normalizer;
pub mod phraser;
pub mod spellchecker;
pub mod transcriber;

use crate::ledger::Span;
use crate::params::{NormalizationDomain, PhonemeDescription, TextCleanerParams};
use std::collections::HashMap;

/// Failure inside a stage collaborator.
///
/// Carries only the message; the orchestrator tags it with the stage that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure(pub String);

impl StageFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StageFailure {}

pub type StageResult<T> = std::result::Result<T, StageFailure>;

/// One unit of cleaner output, in left-to-right input order.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanedUnit {
    /// A textual token: original substring, its character span, the cleaned
    /// form and any sub-token split.
    Word {
        original: String,
        span: Span,
        clean: String,
        sub_tokens: Vec<String>,
    },
    /// A non-textual marker the cleaner recognized or produced.
    Tag {
        name: String,
        ssml_start: bool,
        ssml_end: bool,
    },
}

/// One normalized form produced for an input token.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedForm {
    pub normalized: String,
    pub pos: String,
}

impl NormalizedForm {
    pub fn new(normalized: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            normalized: normalized.into(),
            pos: pos.into(),
        }
    }
}

/// Spellchecker verdict for one token.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub corrected: String,
    pub changed: bool,
}

/// Markup to plain text, run before the cleaner when `parse_html` is set.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> StageResult<String>;
}

/// Raw text + cleaning parameters to clean tokens with spans and embedded
/// tag tokens. The cleaner owns the tokenization that seeds the ledger.
pub trait Cleaner: Send + Sync {
    fn clean(&self, text: &str, params: &TextCleanerParams) -> StageResult<Vec<CleanedUnit>>;
}

/// Clean token forms to normalized forms, one list per input token (a
/// token may expand to several words, e.g. a number).
pub trait Normalizer: Send + Sync {
    fn normalize(
        &self,
        tokens: &[String],
        domain: NormalizationDomain,
    ) -> StageResult<Vec<Vec<NormalizedForm>>>;
}

/// Per-token spell correction, applied before normalization.
pub trait Spellchecker: Send + Sync {
    fn correct(&self, token: &str) -> StageResult<Correction>;
}

/// Phrase-boundary detection over normalized token strings. Returns the
/// slice positions after which a pause belongs.
pub trait Phraser: Send + Sync {
    fn phrase(&self, tokens: &[String]) -> StageResult<Vec<usize>>;
}

/// Grapheme-to-phoneme conversion for one normalized token.
///
/// Output is a plain space-separated phone string without syllable or
/// stress marks; the orchestrator applies those uniformly afterwards.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, token: &str, description: &PhonemeDescription) -> StageResult<String>;
}

// ── Mock implementations ────────────────────────────────────────────────

/// Mock extractor returning a fixed response.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    response: Option<String>,
    should_fail: bool,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl TextExtractor for MockExtractor {
    fn extract(&self, markup: &str) -> StageResult<String> {
        if self.should_fail {
            return Err(StageFailure::new("mock extraction failure"));
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| markup.to_string()))
    }
}

/// Mock cleaner: whitespace tokenization, identity clean forms, inline
/// `<name/>` markers become tags. Good enough to drive the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct MockCleaner {
    should_fail: bool,
}

impl MockCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Cleaner for MockCleaner {
    fn clean(&self, text: &str, _params: &TextCleanerParams) -> StageResult<Vec<CleanedUnit>> {
        if self.should_fail {
            return Err(StageFailure::new("mock cleaning failure"));
        }
        let mut units = Vec::new();
        let mut char_pos = 0usize;
        let mut word_start = 0usize;
        let mut word = String::new();
        for ch in text.chars().chain(std::iter::once(' ')) {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    if let Some(name) = word.strip_prefix('<').and_then(|w| w.strip_suffix("/>")) {
                        units.push(CleanedUnit::Tag {
                            name: name.to_string(),
                            ssml_start: false,
                            ssml_end: false,
                        });
                    } else {
                        units.push(CleanedUnit::Word {
                            original: word.clone(),
                            span: Span::new(word_start, char_pos),
                            clean: word.clone(),
                            sub_tokens: Vec::new(),
                        });
                    }
                    word.clear();
                }
            } else {
                if word.is_empty() {
                    word_start = char_pos;
                }
                word.push(ch);
            }
            char_pos += 1;
        }
        Ok(units)
    }
}

/// Mock normalizer: identity forms with a fixed POS tag, plus optional
/// per-token overrides.
#[derive(Debug, Clone, Default)]
pub struct MockNormalizer {
    overrides: HashMap<String, Vec<String>>,
    should_fail: bool,
}

impl MockNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `token` to the given forms instead of identity.
    pub fn with_mapping(mut self, token: &str, forms: &[&str]) -> Self {
        self.overrides
            .insert(token.to_string(), forms.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Normalizer for MockNormalizer {
    fn normalize(
        &self,
        tokens: &[String],
        _domain: NormalizationDomain,
    ) -> StageResult<Vec<Vec<NormalizedForm>>> {
        if self.should_fail {
            return Err(StageFailure::new("mock normalization failure"));
        }
        Ok(tokens
            .iter()
            .map(|token| match self.overrides.get(token) {
                Some(forms) => forms
                    .iter()
                    .map(|f| NormalizedForm::new(f.clone(), "x"))
                    .collect(),
                None => vec![NormalizedForm::new(token.to_lowercase(), "x")],
            })
            .collect())
    }
}

/// Mock spellchecker backed by an explicit correction map.
#[derive(Debug, Clone, Default)]
pub struct MockSpellchecker {
    corrections: HashMap<String, String>,
    should_fail: bool,
}

impl MockSpellchecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correction(mut self, from: &str, to: &str) -> Self {
        self.corrections.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Spellchecker for MockSpellchecker {
    fn correct(&self, token: &str) -> StageResult<Correction> {
        if self.should_fail {
            return Err(StageFailure::new("mock spellcheck failure"));
        }
        Ok(match self.corrections.get(token) {
            Some(corrected) => Correction {
                corrected: corrected.clone(),
                changed: true,
            },
            None => Correction {
                corrected: token.to_string(),
                changed: false,
            },
        })
    }
}

/// Mock phraser breaking after fixed token positions.
#[derive(Debug, Clone, Default)]
pub struct MockPhraser {
    breaks: Vec<usize>,
    should_fail: bool,
}

impl MockPhraser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breaks(mut self, breaks: &[usize]) -> Self {
        self.breaks = breaks.to_vec();
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Phraser for MockPhraser {
    fn phrase(&self, tokens: &[String]) -> StageResult<Vec<usize>> {
        if self.should_fail {
            return Err(StageFailure::new("mock phrasing failure"));
        }
        Ok(self
            .breaks
            .iter()
            .copied()
            .filter(|&b| b < tokens.len())
            .collect())
    }
}

/// Mock transcriber: per-letter phones, plus optional per-token overrides.
#[derive(Debug, Clone, Default)]
pub struct MockTranscriber {
    overrides: HashMap<String, String>,
    should_fail: bool,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcription(mut self, token: &str, phones: &str) -> Self {
        self.overrides.insert(token.to_string(), phones.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, token: &str, _description: &PhonemeDescription) -> StageResult<String> {
        if self.should_fail {
            return Err(StageFailure::new("mock transcription failure"));
        }
        Ok(match self.overrides.get(token) {
            Some(phones) => phones.clone(),
            None => {
                let phones: Vec<String> = token.chars().map(|c| c.to_string()).collect();
                phones.join(" ")
            }
        })
    }
}
