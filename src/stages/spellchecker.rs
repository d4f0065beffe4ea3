//! Spellchecker stage implementations.
//!
//! The default build corrects nothing; the `symspell` feature adds a
//! frequency-dictionary-backed checker for real correction.

use crate::stages::{Correction, Spellchecker, StageResult};

/// Passthrough spellchecker used when correction is disabled. The
/// orchestrator skips the stage entirely unless `do_spellcorrect` is set,
/// so this is the safety fallback for builds without a dictionary.
#[derive(Debug, Clone, Default)]
pub struct NoopSpellchecker;

impl NoopSpellchecker {
    pub fn new() -> Self {
        Self
    }
}

impl Spellchecker for NoopSpellchecker {
    fn correct(&self, token: &str) -> StageResult<Correction> {
        Ok(Correction {
            corrected: token.to_string(),
            changed: false,
        })
    }
}

#[cfg(feature = "symspell")]
pub use self::symspell_impl::SymspellSpellchecker;

#[cfg(feature = "symspell")]
mod symspell_impl {
    use super::*;
    use crate::stages::StageFailure;
    use std::path::Path;
    use symspell::{SymSpell, UnicodeStringStrategy, Verbosity};

    /// Spellchecker backed by a SymSpell frequency dictionary.
    pub struct SymspellSpellchecker {
        symspell: SymSpell<UnicodeStringStrategy>,
        max_edit_distance: i64,
    }

    impl std::fmt::Debug for SymspellSpellchecker {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SymspellSpellchecker")
                .field("max_edit_distance", &self.max_edit_distance)
                .finish_non_exhaustive()
        }
    }

    impl SymspellSpellchecker {
        /// Loads a frequency dictionary: one `word frequency` pair per
        /// line, whitespace-separated. Malformed lines are skipped.
        pub fn from_file(path: &Path) -> StageResult<Self> {
            let content = std::fs::read_to_string(path).map_err(|e| {
                StageFailure::new(format!(
                    "failed to read dictionary '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let mut symspell: SymSpell<UnicodeStringStrategy> = SymSpell::default();
            for line in content.lines() {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2
                    && let Ok(freq) = parts[1].parse::<i64>()
                {
                    symspell.load_dictionary_line(&format!("{} {}", parts[0], freq), 0, 1, " ");
                }
            }

            Ok(Self {
                symspell,
                max_edit_distance: 2,
            })
        }
    }

    impl Spellchecker for SymspellSpellchecker {
        fn correct(&self, token: &str) -> StageResult<Correction> {
            // Numbers and punctuation are never spelling mistakes
            if token.is_empty() || !token.chars().any(|c| c.is_alphabetic()) {
                return Ok(Correction {
                    corrected: token.to_string(),
                    changed: false,
                });
            }
            let suggestions = self
                .symspell
                .lookup(token, Verbosity::Top, self.max_edit_distance);
            match suggestions.first() {
                Some(suggestion) if suggestion.term != token => Ok(Correction {
                    corrected: suggestion.term.clone(),
                    changed: true,
                }),
                _ => Ok(Correction {
                    corrected: token.to_string(),
                    changed: false,
                }),
            }
        }
    }
}
