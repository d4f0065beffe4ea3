//! Canonical default parameters for the preprocessing pipeline.
//!
//! The registry is built once at process start, is immutable afterwards and
//! is passed by reference into the orchestrator. A request field left at its
//! zero value resolves to the value recorded here; the defaults query
//! returns these values verbatim.

use crate::params::{
    NormalizationDomain, NormalizeOptions, PhonemeDescription, TextCleanerParams,
};

/// Default language code: ISO-639 language + ISO-3166 region.
pub const DEFAULT_LANGUAGE_CODE: &str = "is-IS";

/// Default maximum number of tokens per processed-content chunk.
///
/// Sentences above this are split at the nearest acceptable boundary when
/// sentence splitting is requested. The wire field is named
/// `max_characters_in_chunk` for compatibility; it has always been a token
/// count.
pub const MAX_CHUNK_TOKENS: u32 = 30;

/// Default normalization domain.
pub const DEFAULT_DOMAIN: NormalizationDomain = NormalizationDomain::Other;

/// Name of the pause tag inserted at phrase boundaries and recognized from
/// inline `<sil/>` markers.
pub const PAUSE_TAG: &str = "sil";

/// Name of the sentence boundary tag inserted by sentence splitting.
pub const SENTENCE_TAG: &str = "sentence";

/// Normalization parameters with every field resolved to a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNormalize {
    pub domain: NormalizationDomain,
    pub do_spellcorrect: bool,
    pub phrasing: bool,
    pub sentence_split: bool,
    pub max_chunk_tokens: u32,
}

/// Immutable registry of canonical defaults.
#[derive(Debug, Clone)]
pub struct DefaultRegistry {
    language_code: String,
    cleaner: TextCleanerParams,
    normalize: ResolvedNormalize,
    description: PhonemeDescription,
}

impl DefaultRegistry {
    pub fn new() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            cleaner: TextCleanerParams::default(),
            normalize: ResolvedNormalize {
                domain: DEFAULT_DOMAIN,
                do_spellcorrect: false,
                phrasing: false,
                sentence_split: false,
                max_chunk_tokens: MAX_CHUNK_TOKENS,
            },
            description: PhonemeDescription::default(),
        }
    }

    /// The canonical default language code.
    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    /// The canonical default cleaning parameters, verbatim.
    pub fn cleaner(&self) -> &TextCleanerParams {
        &self.cleaner
    }

    /// The canonical default normalization parameters, verbatim.
    pub fn normalize(&self) -> ResolvedNormalize {
        self.normalize
    }

    /// The canonical default phoneme description, verbatim.
    pub fn description(&self) -> &PhonemeDescription {
        &self.description
    }

    /// Resolves a wire language code; empty means the default.
    pub fn resolve_language(&self, raw: &str) -> String {
        if raw.is_empty() {
            self.language_code.clone()
        } else {
            raw.to_string()
        }
    }

    /// Resolves wire normalization options against the defaults.
    pub fn resolve_options(&self, options: &NormalizeOptions) -> ResolvedNormalize {
        ResolvedNormalize {
            domain: options.domain.unwrap_or(self.normalize.domain),
            do_spellcorrect: options
                .do_spellcorrect
                .unwrap_or(self.normalize.do_spellcorrect),
            phrasing: options.phrasing.unwrap_or(self.normalize.phrasing),
            sentence_split: options
                .sentence_split
                .unwrap_or(self.normalize.sentence_split),
            max_chunk_tokens: options
                .max_characters_in_chunk
                .unwrap_or(self.normalize.max_chunk_tokens),
        }
    }

    /// Resolves cleaner parameters; an absent block or zero-valued fields
    /// fall back to the defaults. `punctuation_replacement` is exempt: its
    /// zero value (empty, meaning delete) is the default itself.
    pub fn resolve_cleaner(&self, params: Option<&TextCleanerParams>) -> TextCleanerParams {
        let Some(params) = params else {
            return self.cleaner.clone();
        };
        let mut resolved = params.clone();
        if resolved.emoji_replacement.is_empty() {
            resolved.emoji_replacement = self.cleaner.emoji_replacement.clone();
        }
        if resolved.preserve_punctuation.is_empty() {
            resolved.preserve_punctuation = self.cleaner.preserve_punctuation.clone();
        }
        resolved
    }

    /// Resolves the phoneme description; absent means the default. Reserved
    /// format/model selections fail here, before any stage runs.
    pub fn resolve_description(
        &self,
        description: Option<&PhonemeDescription>,
    ) -> crate::error::Result<PhonemeDescription> {
        let resolved = description.cloned().unwrap_or_else(|| self.description.clone());
        resolved.validate()?;
        Ok(resolved)
    }
}

impl Default for DefaultRegistry {
    fn default() -> Self {
        Self::new()
    }
}
