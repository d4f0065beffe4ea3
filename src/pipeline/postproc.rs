//! Transcription post-processing: syllabification and stress labels.
//!
//! Applied by the orchestrator to every transcription, whether it came
//! from the model or from a user pronunciation dictionary, so both are
//! indistinguishable in final format. Icelandic carries primary stress on
//! the first syllable, which keeps stress assignment deterministic.

use crate::params::{Alphabet, PhonemeDescription};

/// Characters that mark a phone as a vowel nucleus, per alphabet.
fn vowel_chars(alphabet: Alphabet) -> &'static str {
    match alphabet {
        Alphabet::Ipa => "aeiouyɛɪɔʏœ",
        Alphabet::Sampa => "aeiouyEIOY9",
    }
}

/// Primary stress marker, per alphabet.
fn stress_marker(alphabet: Alphabet) -> &'static str {
    match alphabet {
        Alphabet::Ipa => "ˈ",
        Alphabet::Sampa => "\"",
    }
}

fn is_vowel(phone: &str, alphabet: Alphabet) -> bool {
    phone.chars().any(|c| vowel_chars(alphabet).contains(c))
}

/// Splits a phone sequence into syllables, one vowel nucleus each.
///
/// A single intervocalic consonant becomes the onset of the following
/// syllable; of a longer cluster, only the last consonant does. Leading
/// and trailing consonants attach to the first and last syllable.
fn syllabify<'a>(phones: &[&'a str], alphabet: Alphabet) -> Vec<Vec<&'a str>> {
    let nuclei: Vec<usize> = phones
        .iter()
        .enumerate()
        .filter_map(|(i, p)| is_vowel(p, alphabet).then_some(i))
        .collect();
    if nuclei.len() < 2 {
        return vec![phones.to_vec()];
    }

    let mut syllables: Vec<Vec<&str>> = Vec::new();
    let mut start = 0usize;
    for window in nuclei.windows(2) {
        let (nucleus, next_nucleus) = (window[0], window[1]);
        // Consonants strictly between the nuclei
        let cluster_len = next_nucleus - nucleus - 1;
        let boundary = if cluster_len <= 1 {
            nucleus + 1
        } else {
            next_nucleus - 1
        };
        syllables.push(phones[start..boundary].to_vec());
        start = boundary;
    }
    syllables.push(phones[start..].to_vec());
    syllables
}

/// Applies syllabification and stress labeling per the description.
///
/// An empty `syllable_separator` means no syllabification; stress labels
/// then attach to the first phone of the word.
pub fn apply(phones: &str, description: &PhonemeDescription) -> String {
    let phone_list: Vec<&str> = phones.split_whitespace().collect();
    if phone_list.is_empty() {
        return String::new();
    }
    let alphabet = description.alphabet;

    let mut syllables: Vec<Vec<String>> = if description.syllable_separator.is_empty() {
        vec![phone_list.iter().map(|p| p.to_string()).collect()]
    } else {
        syllabify(&phone_list, alphabet)
            .into_iter()
            .map(|syl| syl.into_iter().map(|p| p.to_string()).collect())
            .collect()
    };

    if description.stress_labels
        && let Some(first_phone) = syllables.first_mut().and_then(|syl| syl.first_mut())
    {
        *first_phone = format!("{}{}", stress_marker(alphabet), first_phone);
    }

    let rendered: Vec<String> = syllables.iter().map(|syl| syl.join(" ")).collect();
    if description.syllable_separator.is_empty() {
        rendered.join(" ")
    } else {
        rendered.join(&format!(" {} ", description.syllable_separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(separator: &str, stress: bool) -> PhonemeDescription {
        PhonemeDescription {
            syllable_separator: separator.to_string(),
            stress_labels: stress,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_separator_no_stress_is_identity() {
        let result = apply("r ei k j a v i k", &describe("", false));
        assert_eq!(result, "r ei k j a v i k");
    }

    #[test]
    fn test_syllabification_with_dot_separator() {
        let result = apply("r ei k j a v i k", &describe(".", false));
        assert_eq!(result, "r ei k . j a . v i k");
    }

    #[test]
    fn test_single_intervocalic_consonant_onsets_next() {
        // t a l a → t a . l a
        let result = apply("t a l a", &describe(".", false));
        assert_eq!(result, "t a . l a");
    }

    #[test]
    fn test_cluster_splits_before_last_consonant() {
        // h ɛ s t a r → h ɛ s . t a r
        let result = apply("h ɛ s t a r", &describe(".", false));
        assert_eq!(result, "h ɛ s . t a r");
    }

    #[test]
    fn test_stress_attaches_to_first_syllable() {
        let result = apply("r ei k j a v i k", &describe(".", true));
        assert_eq!(result, "ˈr ei k . j a . v i k");
    }

    #[test]
    fn test_stress_without_syllabification() {
        let result = apply("t a l a", &describe("", true));
        assert_eq!(result, "ˈt a l a");
    }

    #[test]
    fn test_sampa_stress_marker() {
        let description = PhonemeDescription {
            alphabet: Alphabet::Sampa,
            syllable_separator: ".".to_string(),
            stress_labels: true,
            ..Default::default()
        };
        let result = apply("t a l a", &description);
        assert_eq!(result, "\"t a . l a");
    }

    #[test]
    fn test_sampa_vowels_detected() {
        let description = PhonemeDescription {
            alphabet: Alphabet::Sampa,
            syllable_separator: ".".to_string(),
            ..Default::default()
        };
        // E and a are SAMPA vowels
        let result = apply("h E s t a r", &description);
        assert_eq!(result, "h E s . t a r");
    }

    #[test]
    fn test_monosyllable_is_untouched_by_separator() {
        let result = apply("j au", &describe(".", false));
        assert_eq!(result, "j au");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(apply("", &describe(".", true)), "");
    }

    #[test]
    fn test_custom_separator() {
        let result = apply("t a l a", &describe("-", false));
        assert_eq!(result, "t a - l a");
    }

    #[test]
    fn test_dictionary_style_long_vowel() {
        // Dictionary entries may carry phones unknown to the rule tables
        // (e.g. long vowels); postproc only cares about vowel characters.
        let result = apply("r ei k j a v ii k", &describe(".", true));
        assert_eq!(result, "ˈr ei k . j a . v ii k");
    }
}
