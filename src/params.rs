//! Request parameter types shared across the pipeline.
//!
//! Wire rule: a field at its zero value ("" / 0 / false / absent enum) is
//! indistinguishable from an unset field and resolves to the registry
//! default. Internally those fields are `Option<T>`; the `de_zero`
//! deserializers collapse wire zero values to `None` so the rest of the
//! code never has to guess.

use crate::error::FrontendError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Rule-set selector for locale-specific normalization (digit ranges etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationDomain {
    Sport,
    #[default]
    Other,
}

impl FromStr for NormalizationDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sport" => Ok(NormalizationDomain::Sport),
            "other" => Ok(NormalizationDomain::Other),
            _ => Err(format!("unknown normalization domain: {}", s)),
        }
    }
}

/// Phonetic alphabet for transcription output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    #[default]
    Ipa,
    Sampa,
}

impl FromStr for Alphabet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipa" => Ok(Alphabet::Ipa),
            "sampa" => Ok(Alphabet::Sampa),
            _ => Err(format!("unknown alphabet: {}", s)),
        }
    }
}

/// Transcription output format. `Cmu` is reserved and not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonemeFormat {
    #[default]
    Plain,
    Cmu,
}

/// Pronunciation dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Standard,
    North,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Dialect::Standard),
            "north" => Ok(Dialect::North),
            _ => Err(format!("unknown dialect: {}", s)),
        }
    }
}

/// Transcription model selector. `Fast` is reserved and not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionModel {
    #[default]
    Lstm,
    Fast,
}

/// Full description of the requested phonetic output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonemeDescription {
    pub alphabet: Alphabet,
    pub format: PhonemeFormat,
    pub dialect: Dialect,
    pub model: TranscriptionModel,
    /// Empty means no syllabification.
    pub syllable_separator: String,
    pub stress_labels: bool,
    /// Empty means no word separator in processed content.
    pub word_separator: String,
}

impl PhonemeDescription {
    /// Rejects reserved-but-unimplemented selections explicitly. The
    /// contract forbids silently substituting another format or model.
    pub fn validate(&self) -> Result<(), FrontendError> {
        if self.format == PhonemeFormat::Cmu {
            return Err(FrontendError::Unimplemented {
                feature: "CMU output format".to_string(),
            });
        }
        if self.model == TranscriptionModel::Fast {
            return Err(FrontendError::Unimplemented {
                feature: "fast transcription model".to_string(),
            });
        }
        Ok(())
    }
}

/// Cleaning-stage parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextCleanerParams {
    /// Replacement string for emojis when they are not preserved.
    pub emoji_replacement: String,
    /// Extra character/string replacements applied before tokenization.
    pub char_replacements: HashMap<String, String>,
    /// Replacement for punctuation outside the preserved set. Empty deletes.
    pub punctuation_replacement: String,
    /// Characters considered part of the language. Empty means the built-in
    /// Icelandic alphabet.
    pub alphabet: String,
    /// Punctuation characters passed through unchanged.
    pub preserve_punctuation: String,
    /// Literal strings passed through unchanged even when outside the
    /// alphabet.
    pub preserve_strings: Vec<String>,
    pub preserve_emojis: bool,
    /// Replace preserved emojis with a textual description.
    pub describe_emojis: bool,
    /// Delete foreign-labelled spans instead of wrapping them in tags.
    pub delete_foreign: bool,
}

impl Default for TextCleanerParams {
    fn default() -> Self {
        Self {
            emoji_replacement: ".".to_string(),
            char_replacements: HashMap::new(),
            punctuation_replacement: String::new(),
            alphabet: String::new(),
            preserve_punctuation: ".,?!:;-".to_string(),
            preserve_strings: Vec::new(),
            preserve_emojis: false,
            describe_emojis: false,
            delete_foreign: false,
        }
    }
}

/// Normalization-stage options as they arrive on the wire.
///
/// `None` means "use the registry default"; the wire cannot express the
/// difference between unset and explicitly-zero, so both land here as
/// `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    #[serde(
        deserialize_with = "de_zero::domain",
        skip_serializing_if = "Option::is_none"
    )]
    pub domain: Option<NormalizationDomain>,
    #[serde(
        deserialize_with = "de_zero::bool_false",
        skip_serializing_if = "Option::is_none"
    )]
    pub do_spellcorrect: Option<bool>,
    #[serde(
        deserialize_with = "de_zero::bool_false",
        skip_serializing_if = "Option::is_none"
    )]
    pub phrasing: Option<bool>,
    #[serde(
        deserialize_with = "de_zero::bool_false",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentence_split: Option<bool>,
    /// Despite the wire name this bounds the token count of a chunk.
    #[serde(
        deserialize_with = "de_zero::u32_zero",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_characters_in_chunk: Option<u32>,
}

/// Deserializers collapsing wire zero values to `None`.
pub(crate) mod de_zero {
    use super::NormalizationDomain;
    use serde::{Deserialize, Deserializer};

    pub fn bool_false<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bool>::deserialize(deserializer)?;
        Ok(match value {
            Some(true) => Some(true),
            _ => None,
        })
    }

    pub fn u32_zero<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<u32>::deserialize(deserializer)?;
        Ok(value.filter(|&v| v != 0))
    }

    pub fn string_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }

    pub fn domain<'de, D>(deserializer: D) -> Result<Option<NormalizationDomain>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
