//! Rule-based text cleaner.
//!
//! Owns the tokenization that seeds the ledger: whitespace-separated raw
//! tokens with character spans into the input, a cleaned form per token,
//! sub-token splits on embedded punctuation, and tag tokens for inline
//! `<name/>` markers and foreign-labelled words.

use crate::ledger::Span;
use crate::params::TextCleanerParams;
use crate::stages::{CleanedUnit, Cleaner, StageResult};

/// Letters of the Icelandic alphabet, lowercase. Used when the request
/// supplies no custom alphabet.
pub const ICELANDIC_ALPHABET: &str = "aábdðeéfghiíjklmnoóprstuúvxyýþæö";

/// Name of the tag wrapped around foreign-labelled words.
pub const FOREIGN_TAG: &str = "foreign";

/// Deterministic rule-based cleaner.
#[derive(Debug, Clone, Default)]
pub struct RuleCleaner;

impl RuleCleaner {
    pub fn new() -> Self {
        Self
    }

    fn is_emoji(ch: char) -> bool {
        let code = ch as u32;
        (0x1F300..=0x1FAFF).contains(&code)
            || (0x2600..=0x27BF).contains(&code)
            || (0x1F000..=0x1F0FF).contains(&code)
            || code == 0xFE0F
    }

    fn describe_emoji(ch: char) -> &'static str {
        match ch {
            '\u{1F600}'..='\u{1F64F}' => "broskarl",
            '\u{2764}' | '\u{1F493}'..='\u{1F49F}' => "hjarta",
            _ => "tákn",
        }
    }

    fn in_alphabet(ch: char, alphabet: &str) -> bool {
        ch.to_lowercase().all(|lower| alphabet.contains(lower))
    }

    /// A purely alphabetic token with letters outside the alphabet is
    /// treated as foreign-labelled.
    fn is_foreign(token: &str, alphabet: &str) -> bool {
        token
            .chars()
            .any(|ch| ch.is_alphabetic() && !Self::in_alphabet(ch, alphabet))
    }

    /// Cleans one raw token. Returns the clean form and its sub-tokens.
    fn clean_token(&self, raw: &str, params: &TextCleanerParams) -> (String, Vec<String>) {
        if params.preserve_strings.iter().any(|s| s == raw) {
            return (raw.to_string(), Vec::new());
        }

        // String replacements first, in deterministic key order
        let mut text = raw.to_string();
        let mut keys: Vec<&String> = params.char_replacements.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(replacement) = params.char_replacements.get(key) {
                text = text.replace(key.as_str(), replacement);
            }
        }

        let mut clean = String::new();
        for ch in text.chars() {
            if Self::is_emoji(ch) {
                if params.preserve_emojis {
                    if params.describe_emojis {
                        clean.push_str(Self::describe_emoji(ch));
                    } else {
                        clean.push(ch);
                    }
                } else {
                    clean.push_str(&params.emoji_replacement);
                }
            } else if ch.is_alphanumeric() {
                clean.push(ch);
            } else if params.preserve_punctuation.contains(ch) {
                clean.push(ch);
            } else if !ch.is_whitespace() {
                clean.push_str(&params.punctuation_replacement);
            }
        }

        let sub_tokens = Self::split_sub_tokens(&clean);
        (clean, sub_tokens)
    }

    /// Splits a clean form into sub-tokens at punctuation boundaries.
    /// A form without embedded punctuation yields no split.
    fn split_sub_tokens(clean: &str) -> Vec<String> {
        let mut runs: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_is_word = true;
        for ch in clean.chars() {
            let is_word = ch.is_alphanumeric();
            if !current.is_empty() && is_word != current_is_word {
                runs.push(std::mem::take(&mut current));
            }
            current_is_word = is_word;
            current.push(ch);
        }
        if !current.is_empty() {
            runs.push(current);
        }
        if runs.len() > 1 { runs } else { Vec::new() }
    }
}

impl Cleaner for RuleCleaner {
    fn clean(&self, text: &str, params: &TextCleanerParams) -> StageResult<Vec<CleanedUnit>> {
        let alphabet = if params.alphabet.is_empty() {
            ICELANDIC_ALPHABET
        } else {
            params.alphabet.as_str()
        };

        let mut units = Vec::new();
        let mut char_pos = 0usize;
        let mut word_start = 0usize;
        let mut word = String::new();

        for ch in text.chars().chain(std::iter::once(' ')) {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    self.flush_token(&word, word_start, char_pos, params, alphabet, &mut units);
                    word.clear();
                }
            } else {
                if word.is_empty() {
                    word_start = char_pos;
                }
                word.push(ch);
            }
            char_pos += 1;
        }

        Ok(units)
    }
}

impl RuleCleaner {
    fn flush_token(
        &self,
        word: &str,
        start: usize,
        end: usize,
        params: &TextCleanerParams,
        alphabet: &str,
        units: &mut Vec<CleanedUnit>,
    ) {
        // Inline stand-alone marker: <sil/> and friends
        if let Some(name) = word.strip_prefix('<').and_then(|w| w.strip_suffix("/>"))
            && !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            units.push(CleanedUnit::Tag {
                name: name.to_string(),
                ssml_start: false,
                ssml_end: false,
            });
            return;
        }

        let foreign = Self::is_foreign(word, alphabet)
            && !params.preserve_strings.iter().any(|s| s == word);
        if foreign && params.delete_foreign {
            return;
        }

        let (clean, sub_tokens) = self.clean_token(word, params);

        if foreign {
            units.push(CleanedUnit::Tag {
                name: FOREIGN_TAG.to_string(),
                ssml_start: true,
                ssml_end: false,
            });
            units.push(CleanedUnit::Word {
                original: word.to_string(),
                span: Span::new(start, end),
                clean,
                sub_tokens,
            });
            units.push(CleanedUnit::Tag {
                name: FOREIGN_TAG.to_string(),
                ssml_start: false,
                ssml_end: true,
            });
        } else {
            units.push(CleanedUnit::Word {
                original: word.to_string(),
                span: Span::new(start, end),
                clean,
                sub_tokens,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(units: &[CleanedUnit]) -> Vec<(&str, &str)> {
        units
            .iter()
            .filter_map(|u| match u {
                CleanedUnit::Word { original, clean, .. } => {
                    Some((original.as_str(), clean.as_str()))
                }
                CleanedUnit::Tag { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_cleans_to_itself() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("veðrið er gott", &TextCleanerParams::default())
            .unwrap();
        assert_eq!(
            words(&units),
            vec![("veðrið", "veðrið"), ("er", "er"), ("gott", "gott")]
        );
    }

    #[test]
    fn test_spans_track_character_positions() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("orð á blaði", &TextCleanerParams::default())
            .unwrap();
        let spans: Vec<Span> = units
            .iter()
            .filter_map(|u| match u {
                CleanedUnit::Word { span, .. } => Some(*span),
                CleanedUnit::Tag { .. } => None,
            })
            .collect();
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(4, 5), Span::new(6, 11)]);
    }

    #[test]
    fn test_inline_marker_becomes_tag() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("Hello <sil/> world", &TextCleanerParams::default())
            .unwrap();
        let tags: Vec<&str> = units
            .iter()
            .filter_map(|u| match u {
                CleanedUnit::Tag { name, .. } => Some(name.as_str()),
                CleanedUnit::Word { .. } => None,
            })
            .collect();
        assert_eq!(tags, vec!["sil"]);
    }

    #[test]
    fn test_emoji_replaced_by_default() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("gaman 😀", &TextCleanerParams::default())
            .unwrap();
        assert_eq!(words(&units), vec![("gaman", "gaman"), ("😀", ".")]);
    }

    #[test]
    fn test_emoji_preserved_when_requested() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            preserve_emojis: true,
            ..Default::default()
        };
        let units = cleaner.clean("gaman 😀", &params).unwrap();
        assert_eq!(words(&units)[1], ("😀", "😀"));
    }

    #[test]
    fn test_emoji_described_when_requested() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            preserve_emojis: true,
            describe_emojis: true,
            ..Default::default()
        };
        let units = cleaner.clean("gaman 😀", &params).unwrap();
        assert_eq!(words(&units)[1], ("😀", "broskarl"));
    }

    #[test]
    fn test_unpreserved_punctuation_is_dropped() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("sjáðu* þetta", &TextCleanerParams::default())
            .unwrap();
        assert_eq!(words(&units)[0], ("sjáðu*", "sjáðu"));
    }

    #[test]
    fn test_punctuation_replacement_applies() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            punctuation_replacement: ",".to_string(),
            ..Default::default()
        };
        let units = cleaner.clean("sjáðu* þetta", &params).unwrap();
        assert_eq!(words(&units)[0], ("sjáðu*", "sjáðu,"));
    }

    #[test]
    fn test_char_replacements_apply_before_classification() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            char_replacements: [("%".to_string(), "prósent".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let units = cleaner.clean("50%", &params).unwrap();
        assert_eq!(words(&units)[0], ("50%", "50prósent"));
    }

    #[test]
    fn test_preserved_string_passes_verbatim() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            preserve_strings: vec!["C++".to_string()],
            ..Default::default()
        };
        let units = cleaner.clean("forritað í C++", &params).unwrap();
        assert_eq!(words(&units)[2], ("C++", "C++"));
    }

    #[test]
    fn test_foreign_word_is_wrapped_in_paired_tags() {
        let cleaner = RuleCleaner::new();
        let units = cleaner
            .clean("hann sagði window", &TextCleanerParams::default())
            .unwrap();
        // window contains 'w', outside the Icelandic alphabet
        let shapes: Vec<String> = units
            .iter()
            .map(|u| match u {
                CleanedUnit::Word { original, .. } => format!("w:{}", original),
                CleanedUnit::Tag {
                    name,
                    ssml_start,
                    ssml_end,
                } => format!("t:{}:{}:{}", name, ssml_start, ssml_end),
            })
            .collect();
        assert_eq!(
            shapes,
            vec![
                "w:hann",
                "w:sagði",
                "t:foreign:true:false",
                "w:window",
                "t:foreign:false:true"
            ]
        );
    }

    #[test]
    fn test_foreign_word_deleted_when_requested() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            delete_foreign: true,
            ..Default::default()
        };
        let units = cleaner.clean("hann sagði window", &params).unwrap();
        assert_eq!(words(&units), vec![("hann", "hann"), ("sagði", "sagði")]);
    }

    #[test]
    fn test_custom_alphabet_overrides_foreign_detection() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams {
            alphabet: "abcdefghijklmnopqrstuvwxyz".to_string(),
            ..Default::default()
        };
        let units = cleaner.clean("window", &params).unwrap();
        assert_eq!(units.len(), 1, "no foreign tags with an English alphabet");
    }

    #[test]
    fn test_sub_tokens_split_on_embedded_punctuation() {
        let cleaner = RuleCleaner::new();
        let units = cleaner.clean("10-12", &TextCleanerParams::default()).unwrap();
        match &units[0] {
            CleanedUnit::Word { sub_tokens, .. } => {
                assert_eq!(sub_tokens, &vec!["10", "-", "12"]);
            }
            CleanedUnit::Tag { .. } => panic!("expected word"),
        }
    }

    #[test]
    fn test_trailing_punctuation_splits() {
        let cleaner = RuleCleaner::new();
        let units = cleaner.clean("búið.", &TextCleanerParams::default()).unwrap();
        match &units[0] {
            CleanedUnit::Word { sub_tokens, .. } => {
                assert_eq!(sub_tokens, &vec!["búið", "."]);
            }
            CleanedUnit::Tag { .. } => panic!("expected word"),
        }
    }

    #[test]
    fn test_unsplit_token_has_no_sub_tokens() {
        let cleaner = RuleCleaner::new();
        let units = cleaner.clean("heill", &TextCleanerParams::default()).unwrap();
        match &units[0] {
            CleanedUnit::Word { sub_tokens, .. } => assert!(sub_tokens.is_empty()),
            CleanedUnit::Tag { .. } => panic!("expected word"),
        }
    }

    #[test]
    fn test_clean_is_idempotent_on_clean_text() {
        let cleaner = RuleCleaner::new();
        let params = TextCleanerParams::default();
        let first = cleaner.clean("veðrið er gott í dag.", &params).unwrap();
        let rejoined: Vec<String> = first
            .iter()
            .filter_map(|u| match u {
                CleanedUnit::Word { clean, .. } => Some(clean.clone()),
                CleanedUnit::Tag { .. } => None,
            })
            .collect();
        let rejoined = rejoined.join(" ");
        let second = cleaner.clean(&rejoined, &params).unwrap();
        let again: Vec<String> = second
            .iter()
            .filter_map(|u| match u {
                CleanedUnit::Word { clean, .. } => Some(clean.clone()),
                CleanedUnit::Tag { .. } => None,
            })
            .collect();
        assert_eq!(rejoined, again.join(" "));
    }
}
