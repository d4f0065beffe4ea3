//! Command-line interface for ttsfront
//!
//! Provides argument parsing using clap derive macros.

use crate::params::{Alphabet, Dialect, NormalizationDomain};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// TTS front-end preprocessing service
#[derive(Parser, Debug)]
#[command(name = "ttsfront", version, about = "TTS front-end preprocessing service")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to Unix socket (default: $XDG_RUNTIME_DIR/ttsfront.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Print full JSON responses instead of processed content only
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Normalization flags shared by normalize and preprocess.
#[derive(clap::Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Normalization domain (sport, other)
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<NormalizationDomain>,

    /// Run spell correction before normalization
    #[arg(long)]
    pub spellcorrect: bool,

    /// Insert pause tags at phrase boundaries
    #[arg(long)]
    pub phrasing: bool,

    /// Split output into one chunk per sentence
    #[arg(long)]
    pub sentence_split: bool,

    /// Maximum tokens per chunk (0 = default)
    #[arg(long, value_name = "N")]
    pub max_chunk: Option<u32>,
}

/// Transcription flags shared by transcribe and preprocess.
#[derive(clap::Args, Debug, Clone)]
pub struct TranscribeArgs {
    /// Phonetic alphabet (ipa, sampa)
    #[arg(long, value_name = "ALPHABET")]
    pub alphabet: Option<Alphabet>,

    /// Pronunciation dialect (standard, north)
    #[arg(long, value_name = "DIALECT")]
    pub dialect: Option<Dialect>,

    /// Syllable separator (empty = no syllabification)
    #[arg(long, value_name = "SEP")]
    pub syllable_separator: Option<String>,

    /// Add stress labels
    #[arg(long)]
    pub stress: bool,

    /// Word separator in processed content
    #[arg(long, value_name = "SEP")]
    pub word_separator: Option<String>,

    /// JSON file with a pronunciation dictionary ({"word": "p h o n e s"})
    #[arg(long, value_name = "FILE")]
    pub dict: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon (foreground process for systemd)
    Daemon {
        /// Per-stage timeout. Examples: 30s, 5m, 500ms
        #[arg(long, value_name = "DURATION", value_parser = parse_timeout_ms)]
        timeout: Option<u64>,
    },

    /// Clean text via the daemon
    Clean {
        /// Text to clean
        content: String,

        /// Treat input as HTML and extract text first
        #[arg(long)]
        parse_html: bool,

        /// Omit tag tokens from processed content
        #[arg(long)]
        no_tags: bool,
    },

    /// Clean and normalize text via the daemon
    Normalize {
        /// Text to normalize
        content: String,

        #[arg(long)]
        parse_html: bool,

        #[arg(long)]
        no_tags: bool,

        #[command(flatten)]
        normalize: NormalizeArgs,
    },

    /// Transcribe pre-normalized text via the daemon
    Transcribe {
        /// Normalized text to transcribe
        content: String,

        #[command(flatten)]
        transcribe: TranscribeArgs,
    },

    /// Run the full pipeline via the daemon
    Preprocess {
        /// Text to preprocess
        content: String,

        #[arg(long)]
        parse_html: bool,

        #[arg(long)]
        no_tags: bool,

        #[command(flatten)]
        normalize: NormalizeArgs,

        #[command(flatten)]
        transcribe: TranscribeArgs,
    },

    /// Query the canonical default parameters
    Defaults,

    /// Query the wire-contract version
    Version,

    /// Get daemon status
    Status,

    /// Shutdown the daemon
    Shutdown,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Parse a timeout duration string into milliseconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `500ms`), and compound (`1m30s`).
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs * 1000);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}
