//! Append-only token ledger.
//!
//! One ledger exists per request. The cleaner's tokenizing step creates it,
//! every later stage appends its contribution, and the finalized ledger is
//! serialized into the response token list. Entries are never deleted or
//! reordered; character spans always point into the original input.

use crate::error::LedgerError;
use crate::params::{NormalizationDomain, PhonemeDescription};
use serde::{Deserialize, Serialize};

/// Half-open character range `[from, to)` into the original input.
///
/// Offsets count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "span_from")]
    pub from: usize,
    #[serde(rename = "span_to")]
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// One normalized form of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedToken {
    pub normalized: String,
    /// Part-of-speech tag assigned by the normalizer.
    pub pos: String,
    /// Set when the spellchecker changed the form before normalization.
    pub spell_corrected: bool,
    /// Normalization domain the form was produced under.
    pub domain: NormalizationDomain,
}

/// One phonetic form of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribedToken {
    pub phonetic: String,
    /// The phoneme description the form was produced under.
    pub description: PhonemeDescription,
}

/// A textual token and its full processing history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Original substring of the input.
    pub name: String,
    /// Cleaned form, recorded by the cleaning stage.
    pub clean: String,
    /// Sub-tokens when cleaning split the original into several units.
    pub sub_tokens: Vec<String>,
    /// Normalized forms in stage order.
    pub normalized: Vec<NormalizedToken>,
    /// Transcribed forms in stage order.
    pub transcribed: Vec<TranscribedToken>,
    /// Stable ledger index, assigned at creation.
    pub index: usize,
    #[serde(flatten)]
    pub span: Span,
}

/// A non-textual marker in the token stream (pause, SSML boundary).
///
/// Both flags false means a stand-alone marker with no matching pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagToken {
    pub name: String,
    pub index: usize,
    pub ssml_start: bool,
    pub ssml_end: bool,
}

/// Entry in the token list: exactly one of token or tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenEntry {
    Token(Token),
    Tag(TagToken),
}

impl TokenEntry {
    pub fn index(&self) -> usize {
        match self {
            TokenEntry::Token(t) => t.index,
            TokenEntry::Tag(t) => t.index,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenEntry::Token(t) => Some(t),
            TokenEntry::Tag(_) => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagToken> {
        match self {
            TokenEntry::Token(_) => None,
            TokenEntry::Tag(t) => Some(t),
        }
    }
}

/// The ordered, append-only record of one input's processing history.
///
/// Entry indices are stable ids assigned at creation; a separate order list
/// records the left-to-right sequence so tags inserted by later stages
/// (phrasing, sentence splitting) land at their ordinal position without
/// renumbering existing entries.
#[derive(Debug, Clone)]
pub struct Ledger {
    input_len: usize,
    entries: Vec<TokenEntry>,
    order: Vec<usize>,
    last_span_to: usize,
}

impl Ledger {
    /// Creates an empty ledger for the given input text.
    pub fn new(input: &str) -> Self {
        Self {
            input_len: input.chars().count(),
            entries: Vec::new(),
            order: Vec::new(),
            last_span_to: 0,
        }
    }

    /// Appends a textual token covering `span` of the input.
    ///
    /// Spans must be monotonic: a span starting before the previous token's
    /// end is a `SpanViolation`.
    pub fn append_token(&mut self, original: &str, span: Span) -> Result<usize, LedgerError> {
        if span.from > span.to || span.to > self.input_len {
            return Err(LedgerError::SpanOutOfBounds {
                span_from: span.from,
                span_to: span.to,
                input_len: self.input_len,
            });
        }
        if span.from < self.last_span_to {
            return Err(LedgerError::SpanViolation {
                span_from: span.from,
                last_to: self.last_span_to,
            });
        }
        let index = self.entries.len();
        self.entries.push(TokenEntry::Token(Token {
            name: original.to_string(),
            clean: String::new(),
            sub_tokens: Vec::new(),
            normalized: Vec::new(),
            transcribed: Vec::new(),
            index,
            span,
        }));
        self.order.push(index);
        self.last_span_to = span.to;
        Ok(index)
    }

    /// Appends a tag token at the current ledger position.
    ///
    /// Tags consume no character span.
    pub fn append_tag(&mut self, name: &str, ssml_start: bool, ssml_end: bool) -> usize {
        let index = self.entries.len();
        self.entries.push(TokenEntry::Tag(TagToken {
            name: name.to_string(),
            index,
            ssml_start,
            ssml_end,
        }));
        self.order.push(index);
        index
    }

    /// Inserts a tag token immediately after the entry named by `after`.
    ///
    /// Used by stages that run once all tokens exist (phrasing, sentence
    /// splitting) to place boundary markers at their ordinal position.
    pub fn insert_tag_after(
        &mut self,
        after: usize,
        name: &str,
        ssml_start: bool,
        ssml_end: bool,
    ) -> Result<usize, LedgerError> {
        let position = self
            .order
            .iter()
            .position(|&id| id == after)
            .ok_or(LedgerError::IndexOutOfRange {
                index: after,
                len: self.entries.len(),
            })?;
        let index = self.entries.len();
        self.entries.push(TokenEntry::Tag(TagToken {
            name: name.to_string(),
            index,
            ssml_start,
            ssml_end,
        }));
        self.order.insert(position + 1, index);
        Ok(index)
    }

    /// Records the cleaning stage output for a token.
    pub fn record_cleaned(
        &mut self,
        index: usize,
        clean: &str,
        sub_tokens: Vec<String>,
    ) -> Result<(), LedgerError> {
        let token = self.token_mut(index)?;
        token.clean = clean.to_string();
        token.sub_tokens = sub_tokens;
        Ok(())
    }

    /// Appends normalized forms to a token. Earlier forms are kept.
    pub fn record_normalized(
        &mut self,
        index: usize,
        forms: Vec<NormalizedToken>,
    ) -> Result<(), LedgerError> {
        self.token_mut(index)?.normalized.extend(forms);
        Ok(())
    }

    /// Appends transcribed forms to a token. Earlier forms are kept.
    pub fn record_transcribed(
        &mut self,
        index: usize,
        forms: Vec<TranscribedToken>,
    ) -> Result<(), LedgerError> {
        self.token_mut(index)?.transcribed.extend(forms);
        Ok(())
    }

    fn token_mut(&mut self, index: usize) -> Result<&mut Token, LedgerError> {
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            None => Err(LedgerError::IndexOutOfRange { index, len }),
            Some(TokenEntry::Tag(_)) => Err(LedgerError::TypeMismatch { index }),
            Some(TokenEntry::Token(token)) => Ok(token),
        }
    }

    /// Entry by stable index.
    pub fn get(&self, index: usize) -> Option<&TokenEntry> {
        self.entries.get(index)
    }

    /// Iterates entries in left-to-right textual order, tags interleaved at
    /// their insertion points.
    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.order.iter().map(|&id| &self.entries[id])
    }

    /// Indices of textual tokens in left-to-right order.
    pub fn token_indices(&self) -> Vec<usize> {
        self.iter()
            .filter_map(|entry| entry.as_token().map(|t| t.index))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Character length of the input this ledger tracks.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Consumes the ledger into the ordered token list for the response.
    pub fn into_token_list(self) -> Vec<TokenEntry> {
        let entries = self.entries;
        self.order
            .iter()
            .map(|&id| entries[id].clone())
            .collect()
    }
}
