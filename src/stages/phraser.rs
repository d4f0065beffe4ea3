//! Phrase-boundary detection.

use crate::stages::{Phraser, StageResult};

/// Conjunctions that open a new phrase; a break lands before them when the
/// preceding phrase is long enough to warrant a pause.
const PHRASE_CONJUNCTIONS: [&str; 5] = ["og", "en", "eða", "heldur", "því"];

/// Minimum tokens between breaks so short clauses are not chopped up.
const MIN_PHRASE_TOKENS: usize = 3;

/// Rule-based phraser: breaks after clause punctuation and before
/// phrase-opening conjunctions.
#[derive(Debug, Clone, Default)]
pub struct PunctuationPhraser;

impl PunctuationPhraser {
    pub fn new() -> Self {
        Self
    }
}

impl Phraser for PunctuationPhraser {
    fn phrase(&self, tokens: &[String]) -> StageResult<Vec<usize>> {
        let mut breaks = Vec::new();
        let mut since_break = 0usize;
        for (position, token) in tokens.iter().enumerate() {
            since_break += 1;
            let is_clause_punct = matches!(token.as_str(), "," | ";" | ":");
            let next_opens_phrase = tokens
                .get(position + 1)
                .is_some_and(|next| PHRASE_CONJUNCTIONS.contains(&next.as_str()));
            let is_last = position + 1 == tokens.len();
            if !is_last
                && since_break >= MIN_PHRASE_TOKENS
                && (is_clause_punct || next_opens_phrase)
            {
                breaks.push(position);
                since_break = 0;
            }
        }
        Ok(breaks)
    }
}
