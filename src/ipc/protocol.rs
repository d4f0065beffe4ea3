//! JSON message protocol for the preprocessing service.
//!
//! Serialized field names are the compatibility contract: a name, once
//! released, is never reassigned to a different meaning. New fields may be
//! added; old ones are only ever retired, never reused. `language_code`
//! (default `is-IS`) is accepted on every request type.
//!
//! Gateway deployments map request variants onto HTTP routes:
//! `preprocess` POST /tts_preprocess, `normalize` POST /tts_normalize,
//! `clean` POST /clean, `transcribe` POST /g2p_transcribe,
//! `get_default_parameters` GET /defaultparameters, `get_version`
//! GET /version.

use crate::abi::AbiVersion;
use crate::error::StageKind;
use crate::ledger::TokenEntry;
use crate::params::{
    NormalizeOptions, PhonemeDescription, TextCleanerParams, de_zero,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clean-only request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextCleanRequest {
    pub content: String,
    #[serde(
        deserialize_with = "de_zero::string_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub language_code: Option<String>,
    pub parse_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_params: Option<TextCleanerParams>,
    pub no_tag_tokens_in_content: bool,
}

/// Clean + normalize request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeRequest {
    pub content: String,
    #[serde(
        deserialize_with = "de_zero::string_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub language_code: Option<String>,
    pub parse_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_params: Option<TextCleanerParams>,
    #[serde(flatten)]
    pub options: NormalizeOptions,
    pub no_tag_tokens_in_content: bool,
}

/// Transcribe-only request over pre-normalized input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct G2pRequest {
    pub content: String,
    #[serde(
        deserialize_with = "de_zero::string_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<PhonemeDescription>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub pronunciation_dict: HashMap<String, String>,
}

/// Full-pipeline request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessRequest {
    pub content: String,
    #[serde(
        deserialize_with = "de_zero::string_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub language_code: Option<String>,
    pub parse_html: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_params: Option<TextCleanerParams>,
    #[serde(flatten)]
    pub options: NormalizeOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<PhonemeDescription>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub pronunciation_dict: HashMap<String, String>,
    pub no_tag_tokens_in_content: bool,
}

/// Clean-only response: a single processed string plus the token list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCleanResponse {
    pub processed_content: String,
    pub tokens: Vec<TokenEntry>,
}

/// Normalize response: one processed string per sentence/chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub processed_content: Vec<String>,
    pub tokens: Vec<TokenEntry>,
}

/// Response shape shared by Preprocess and Transcribe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedResponse {
    pub processed_content: Vec<String>,
    pub tokens: Vec<TokenEntry>,
}

/// The registry defaults, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultProcessingResponse {
    pub language_code: String,
    pub domain: crate::params::NormalizationDomain,
    pub do_spellcorrect: bool,
    pub phrasing: bool,
    pub sentence_split: bool,
    pub max_characters_in_chunk: u32,
    pub description: PhonemeDescription,
    pub cleaner_params: TextCleanerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiVersionResponse {
    pub version: AbiVersion,
}

/// Requests sent by clients to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Full pipeline: clean, normalize, transcribe
    Preprocess(PreprocessRequest),
    /// Clean and normalize
    Normalize(NormalizeRequest),
    /// Clean only
    Clean(TextCleanRequest),
    /// Transcribe pre-normalized input
    Transcribe(G2pRequest),
    /// Query the canonical defaults
    GetDefaultParameters,
    /// Query the wire-contract version
    GetVersion,
    /// Get daemon status
    Status,
    /// Shutdown the daemon
    Shutdown,
}

impl Request {
    /// Serialize request to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize request from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command succeeded with no payload
    Ok,
    Cleaned(TextCleanResponse),
    Normalized(NormalizedResponse),
    Preprocessed(PreprocessedResponse),
    DefaultParameters(DefaultProcessingResponse),
    AbiVersion(AbiVersionResponse),
    /// Current daemon status
    Status {
        ready: bool,
        daemon_version: String,
        abi_version: AbiVersion,
    },
    /// Whole-request failure: error kind, message, failing stage if any
    Error {
        kind: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<StageKind>,
    },
}

impl Response {
    /// Serialize response to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize response from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<&crate::error::FrontendError> for Response {
    fn from(error: &crate::error::FrontendError) -> Self {
        Response::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
            stage: error.stage(),
        }
    }
}
