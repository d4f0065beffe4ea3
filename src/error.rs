//! Error types for ttsfront.

use thiserror::Error;

/// Pipeline stage identifiers, used to tag collaborator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Extractor,
    Cleaner,
    Normalizer,
    Spellchecker,
    Phraser,
    Transcriber,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageKind::Extractor => "extractor",
            StageKind::Cleaner => "cleaner",
            StageKind::Normalizer => "normalizer",
            StageKind::Spellchecker => "spellchecker",
            StageKind::Phraser => "phraser",
            StageKind::Transcriber => "transcriber",
        };
        write!(f, "{}", name)
    }
}

/// Violations of the token ledger's append-only invariants.
///
/// These indicate a collaborator bug and are fatal for the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("span regression: span starts at {span_from} but previous token ends at {last_to}")]
    SpanViolation { span_from: usize, last_to: usize },

    #[error("span [{span_from}, {span_to}) exceeds input length {input_len}")]
    SpanOutOfBounds {
        span_from: usize,
        span_to: usize,
        input_len: usize,
    },

    #[error("ledger index {index} out of range (ledger has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("ledger index {index} names a tag token, not a text token")]
    TypeMismatch { index: usize },
}

#[derive(Error, Debug)]
pub enum FrontendError {
    // Request validation errors
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{feature} is reserved but not implemented")]
    Unimplemented { feature: String },

    // Stage collaborator errors
    #[error("stage {stage} failed: {message}")]
    Stage { stage: StageKind, message: String },

    #[error("stage {stage} exceeded its {timeout_ms}ms deadline")]
    StageTimeout { stage: StageKind, timeout_ms: u64 },

    // Ledger invariant violations
    #[error("ledger invariant violated: {0}")]
    Ledger(#[from] LedgerError),

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl FrontendError {
    /// Wire identifier for the error kind, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            FrontendError::InvalidArgument { .. } => "invalid_argument",
            FrontendError::Unimplemented { .. } => "unimplemented",
            FrontendError::Stage { .. } | FrontendError::StageTimeout { .. } => {
                "upstream_stage_failure"
            }
            FrontendError::Ledger(_) => "ledger_invariant_violation",
            FrontendError::ConfigParse { .. }
            | FrontendError::ConfigInvalidValue { .. }
            | FrontendError::Config(_) => "config",
            FrontendError::IpcSocket { .. }
            | FrontendError::IpcProtocol { .. }
            | FrontendError::IpcConnection { .. } => "ipc",
            FrontendError::Io(_) => "io",
            FrontendError::Other(_) => "internal",
        }
    }

    /// The failing stage, when the error is attributable to one.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            FrontendError::Stage { stage, .. } | FrontendError::StageTimeout { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_argument_display() {
        let error = FrontendError::InvalidArgument {
            message: "unknown alphabet".to_string(),
        };
        assert_eq!(error.to_string(), "invalid argument: unknown alphabet");
    }

    #[test]
    fn test_unimplemented_display() {
        let error = FrontendError::Unimplemented {
            feature: "CMU output format".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "CMU output format is reserved but not implemented"
        );
    }

    #[test]
    fn test_stage_failure_display() {
        let error = FrontendError::Stage {
            stage: StageKind::Normalizer,
            message: "grammar rejected input".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "stage normalizer failed: grammar rejected input"
        );
    }

    #[test]
    fn test_stage_timeout_display() {
        let error = FrontendError::StageTimeout {
            stage: StageKind::Transcriber,
            timeout_ms: 30000,
        };
        assert_eq!(
            error.to_string(),
            "stage transcriber exceeded its 30000ms deadline"
        );
    }

    #[test]
    fn test_span_violation_display() {
        let error = LedgerError::SpanViolation {
            span_from: 3,
            last_to: 5,
        };
        assert_eq!(
            error.to_string(),
            "span regression: span starts at 3 but previous token ends at 5"
        );
    }

    #[test]
    fn test_index_out_of_range_display() {
        let error = LedgerError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            error.to_string(),
            "ledger index 7 out of range (ledger has 3 entries)"
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        let error = LedgerError::TypeMismatch { index: 2 };
        assert_eq!(
            error.to_string(),
            "ledger index 2 names a tag token, not a text token"
        );
    }

    #[test]
    fn test_ledger_error_converts_to_frontend_error() {
        let error: FrontendError = LedgerError::TypeMismatch { index: 0 }.into();
        assert_eq!(error.kind(), "ledger_invariant_violation");
        assert!(error.to_string().contains("ledger invariant violated"));
    }

    #[test]
    fn test_error_kind_mapping() {
        let cases: Vec<(FrontendError, &str)> = vec![
            (
                FrontendError::InvalidArgument {
                    message: "x".to_string(),
                },
                "invalid_argument",
            ),
            (
                FrontendError::Unimplemented {
                    feature: "x".to_string(),
                },
                "unimplemented",
            ),
            (
                FrontendError::Stage {
                    stage: StageKind::Cleaner,
                    message: "x".to_string(),
                },
                "upstream_stage_failure",
            ),
            (
                FrontendError::StageTimeout {
                    stage: StageKind::Phraser,
                    timeout_ms: 1,
                },
                "upstream_stage_failure",
            ),
            (
                FrontendError::Ledger(LedgerError::TypeMismatch { index: 0 }),
                "ledger_invariant_violation",
            ),
            (FrontendError::Other("x".to_string()), "internal"),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "wrong kind for {:?}", error);
        }
    }

    #[test]
    fn test_error_stage_attribution() {
        let error = FrontendError::Stage {
            stage: StageKind::Spellchecker,
            message: "dictionary missing".to_string(),
        };
        assert_eq!(error.stage(), Some(StageKind::Spellchecker));

        let error = FrontendError::Other("no stage".to_string());
        assert_eq!(error.stage(), None);
    }

    #[test]
    fn test_stage_kind_display_names() {
        assert_eq!(StageKind::Extractor.to_string(), "extractor");
        assert_eq!(StageKind::Cleaner.to_string(), "cleaner");
        assert_eq!(StageKind::Normalizer.to_string(), "normalizer");
        assert_eq!(StageKind::Spellchecker.to_string(), "spellchecker");
        assert_eq!(StageKind::Phraser.to_string(), "phraser");
        assert_eq!(StageKind::Transcriber.to_string(), "transcriber");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: FrontendError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: FrontendError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<FrontendError>();
        assert_sync::<FrontendError>();
        assert_send::<LedgerError>();
        assert_sync::<LedgerError>();
    }

    #[test]
    fn test_error_debug_format() {
        let error = FrontendError::Unimplemented {
            feature: "fast transcription model".to_string(),
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Unimplemented"));
        assert!(debug_str.contains("fast transcription model"));
    }
}
