//! ttsfront - TTS front-end preprocessing service
//!
//! Cleans, normalizes and transcribes raw text into a phonetic
//! representation while keeping every token traceable to its character
//! span in the original input.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod abi;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod ledger;
pub mod params;
pub mod pipeline;
pub mod stages;

// Core data model
pub use ledger::{Ledger, NormalizedToken, Span, TagToken, Token, TokenEntry, TranscribedToken};
pub use params::{
    Alphabet, Dialect, NormalizationDomain, NormalizeOptions, PhonemeDescription, PhonemeFormat,
    TextCleanerParams, TranscriptionModel,
};

// Orchestration
pub use defaults::DefaultRegistry;
pub use pipeline::orchestrator::{Orchestrator, StageSet};

// Stage seams (source → process → sink)
pub use stages::{Cleaner, Normalizer, Phraser, Spellchecker, TextExtractor, Transcriber};

// Error handling
pub use error::{FrontendError, LedgerError, Result, StageKind};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"`
/// otherwise. Distinct from [`abi::CURRENT`], which tracks the wire
/// contract, not the package release.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
