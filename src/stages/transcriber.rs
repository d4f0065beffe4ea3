//! Table-driven grapheme-to-phoneme conversion for Icelandic.
//!
//! Longest-match rules over digraphs and single letters, with IPA and
//! SAMPA output columns. Dialect divergence follows the hard-speech
//! (harðmæli) rule: northern speakers aspirate non-initial p/t/k, standard
//! speech does not. Output is a plain space-separated phone string;
//! syllabification and stress marks are applied downstream.

use crate::params::{Alphabet, Dialect, PhonemeDescription};
use crate::stages::{StageFailure, StageResult, Transcriber};

/// Digraph rules, tried before single letters: (grapheme, IPA, SAMPA).
const DIGRAPHS: [(&str, &str, &str); 5] = [
    ("au", "œy", "9y"),
    ("ei", "ei", "ei"),
    ("ey", "ei", "ei"),
    ("hv", "kv", "kv"),
    ("ll", "tl", "tl"),
];

/// Single-letter rules: (grapheme, IPA, SAMPA).
const LETTERS: [(&str, &str, &str); 32] = [
    ("a", "a", "a"),
    ("á", "au", "au"),
    ("b", "p", "p"),
    ("d", "t", "t"),
    ("ð", "ð", "D"),
    ("e", "ɛ", "E"),
    ("é", "jɛ", "jE"),
    ("f", "f", "f"),
    ("g", "k", "k"),
    ("h", "h", "h"),
    ("i", "ɪ", "I"),
    ("í", "i", "i"),
    ("j", "j", "j"),
    ("k", "k", "k"),
    ("l", "l", "l"),
    ("m", "m", "m"),
    ("n", "n", "n"),
    ("o", "ɔ", "O"),
    ("ó", "ou", "ou"),
    ("p", "p", "p"),
    ("r", "r", "r"),
    ("s", "s", "s"),
    ("t", "t", "t"),
    ("u", "ʏ", "Y"),
    ("ú", "u", "u"),
    ("v", "v", "v"),
    ("x", "ks", "ks"),
    ("y", "ɪ", "I"),
    ("ý", "i", "i"),
    ("þ", "θ", "T"),
    ("æ", "ai", "ai"),
    ("ö", "œ", "9"),
];

/// Aspiration marker per alphabet.
fn aspiration(alphabet: Alphabet) -> &'static str {
    match alphabet {
        Alphabet::Ipa => "ʰ",
        Alphabet::Sampa => "_h",
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleTranscriber;

impl RuleTranscriber {
    pub fn new() -> Self {
        Self
    }

    fn pick(alphabet: Alphabet, ipa: &'static str, sampa: &'static str) -> &'static str {
        match alphabet {
            Alphabet::Ipa => ipa,
            Alphabet::Sampa => sampa,
        }
    }
}

impl Transcriber for RuleTranscriber {
    fn transcribe(&self, token: &str, description: &PhonemeDescription) -> StageResult<String> {
        let lower = token.to_lowercase();
        let mut phones: Vec<String> = Vec::new();
        let mut rest = lower.as_str();
        let mut initial = true;

        while !rest.is_empty() {
            if let Some(&(grapheme, ipa, sampa)) =
                DIGRAPHS.iter().find(|&&(g, _, _)| rest.starts_with(g))
            {
                phones.push(Self::pick(description.alphabet, ipa, sampa).to_string());
                rest = &rest[grapheme.len()..];
                initial = false;
                continue;
            }
            let Some(&(grapheme, ipa, sampa)) =
                LETTERS.iter().find(|&&(g, _, _)| rest.starts_with(g))
            else {
                let offending = rest.chars().next().unwrap_or('?');
                return Err(StageFailure::new(format!(
                    "no pronunciation rule for '{}' in '{}'",
                    offending, token
                )));
            };
            let mut phone = Self::pick(description.alphabet, ipa, sampa).to_string();
            // Stops are aspirated word-initially everywhere, and in all
            // positions in the northern dialect.
            if matches!(grapheme, "p" | "t" | "k")
                && (initial || description.dialect == Dialect::North)
            {
                phone.push_str(aspiration(description.alphabet));
            }
            phones.push(phone);
            rest = &rest[grapheme.len()..];
            initial = false;
        }

        Ok(phones.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(alphabet: Alphabet, dialect: Dialect) -> PhonemeDescription {
        PhonemeDescription {
            alphabet,
            dialect,
            ..Default::default()
        }
    }

    #[test]
    fn test_digraphs_match_before_letters() {
        let transcriber = RuleTranscriber::new();
        let result = transcriber
            .transcribe("halló", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap();
        assert_eq!(result, "h a tl ou");
    }

    #[test]
    fn test_ipa_standard_reykjavik() {
        let transcriber = RuleTranscriber::new();
        let result = transcriber
            .transcribe("reykjavík", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap();
        assert_eq!(result, "r ei k j a v i k");
    }

    #[test]
    fn test_sampa_alphabet_selected() {
        let transcriber = RuleTranscriber::new();
        let result = transcriber
            .transcribe("það", &describe(Alphabet::Sampa, Dialect::Standard))
            .unwrap();
        assert_eq!(result, "T a D");
    }

    #[test]
    fn test_initial_stop_is_aspirated() {
        let transcriber = RuleTranscriber::new();
        let result = transcriber
            .transcribe("tala", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap();
        assert_eq!(result, "tʰ a l a");
    }

    #[test]
    fn test_north_dialect_aspirates_internal_stops() {
        let transcriber = RuleTranscriber::new();
        let standard = transcriber
            .transcribe("láta", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap();
        let north = transcriber
            .transcribe("láta", &describe(Alphabet::Ipa, Dialect::North))
            .unwrap();
        assert_eq!(standard, "l au t a");
        assert_eq!(north, "l au tʰ a");
    }

    #[test]
    fn test_north_dialect_sampa_aspiration_marker() {
        let transcriber = RuleTranscriber::new();
        let north = transcriber
            .transcribe("láta", &describe(Alphabet::Sampa, Dialect::North))
            .unwrap();
        assert_eq!(north, "l au t_h a");
    }

    #[test]
    fn test_uppercase_input_is_folded() {
        let transcriber = RuleTranscriber::new();
        let result = transcriber
            .transcribe("HALLÓ", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap();
        assert_eq!(result, "h a tl ou");
    }

    #[test]
    fn test_unknown_grapheme_fails() {
        let transcriber = RuleTranscriber::new();
        let err = transcriber
            .transcribe("tal7a", &describe(Alphabet::Ipa, Dialect::Standard))
            .unwrap_err();
        assert!(err.to_string().contains("no pronunciation rule"));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_output_carries_no_syllable_or_stress_marks() {
        let transcriber = RuleTranscriber::new();
        let description = PhonemeDescription {
            syllable_separator: ".".to_string(),
            stress_labels: true,
            ..Default::default()
        };
        // The transcriber ignores postprocessing fields on purpose
        let result = transcriber.transcribe("halló", &description).unwrap();
        assert!(!result.contains('.'));
        assert!(!result.contains('ˈ'));
    }
}
