//! Rule-based text normalizer.
//!
//! Expands digits, ranges and known abbreviations into Icelandic words and
//! lowercases everything else. Range reading diverges by domain: sport
//! reads `2-1` as a score ("tvö eitt"), everything else as an interval
//! ("tvö til eitt" becomes "tvö til einn" in counting forms).

use crate::params::NormalizationDomain;
use crate::stages::{NormalizedForm, Normalizer, StageResult};

/// POS tag for plain words.
const POS_WORD: &str = "x";
/// POS tag for numerals.
const POS_NUMBER: &str = "ta";
/// POS tag for punctuation forms.
const POS_PUNCT: &str = "pk";

/// Counting forms 0..=19 (masculine where gendered).
const UNITS: [&str; 20] = [
    "núll", "einn", "tveir", "þrír", "fjórir", "fimm", "sex", "sjö", "átta", "níu", "tíu",
    "ellefu", "tólf", "þrettán", "fjórtán", "fimmtán", "sextán", "sautján", "átján", "nítján",
];

/// Neuter forms for 1..=4; scores and counts of hundreds use these.
const UNITS_NEUTER: [(u64, &str); 4] = [(1, "eitt"), (2, "tvö"), (3, "þrjú"), (4, "fjögur")];

const TENS: [&str; 8] = [
    "tuttugu", "þrjátíu", "fjörutíu", "fimmtíu", "sextíu", "sjötíu", "áttatíu", "níutíu",
];

/// Abbreviations expanded before any other rule, matched on the full
/// lowercased token.
const ABBREVIATIONS: [(&str, &[&str]); 6] = [
    ("t.d.", &["til", "dæmis"]),
    ("o.s.frv.", &["og", "svo", "framvegis"]),
    ("þ.e.", &["það", "er"]),
    ("hr.", &["herra"]),
    ("kr.", &["krónur"]),
    ("nr.", &["númer"]),
];

#[derive(Debug, Clone, Default)]
pub struct RuleNormalizer;

impl RuleNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn unit_word(n: u64, neuter: bool) -> &'static str {
        if neuter && let Some(&(_, word)) = UNITS_NEUTER.iter().find(|&&(v, _)| v == n) {
            return word;
        }
        UNITS[n as usize]
    }

    /// Number below one million to words. Larger values are read digit by
    /// digit by the caller.
    fn number_words(n: u64, neuter: bool) -> Vec<String> {
        if n < 20 {
            return vec![Self::unit_word(n, neuter).to_string()];
        }
        let mut words: Vec<String> = Vec::new();
        let thousands = n / 1000;
        let below = n % 1000;
        if thousands > 0 {
            words.extend(Self::number_words(thousands, true));
            words.push("þúsund".to_string());
        }
        let hundreds = below / 100;
        let rest = below % 100;
        if hundreds > 0 {
            words.push(Self::unit_word(hundreds, true).to_string());
            words.push(if hundreds == 1 { "hundrað" } else { "hundruð" }.to_string());
        }
        if rest > 0 {
            if !words.is_empty() {
                words.push("og".to_string());
            }
            if rest < 20 {
                words.push(Self::unit_word(rest, neuter).to_string());
            } else {
                words.push(TENS[(rest / 10 - 2) as usize].to_string());
                if rest % 10 > 0 {
                    words.push("og".to_string());
                    words.push(Self::unit_word(rest % 10, neuter).to_string());
                }
            }
        }
        if words.is_empty() {
            words.push(UNITS[0].to_string());
        }
        words
    }

    fn digits_to_forms(digits: &str, neuter: bool) -> Vec<NormalizedForm> {
        match digits.parse::<u64>() {
            Ok(n) if digits.len() <= 6 => Self::number_words(n, neuter)
                .into_iter()
                .map(|w| NormalizedForm::new(w, POS_NUMBER))
                .collect(),
            // Too long for natural reading: digit by digit
            _ => digits
                .chars()
                .filter_map(|c| c.to_digit(10))
                .map(|d| NormalizedForm::new(Self::unit_word(d as u64, true), POS_NUMBER))
                .collect(),
        }
    }

    fn normalize_token(&self, clean: &str, domain: NormalizationDomain) -> Vec<NormalizedForm> {
        if clean.is_empty() {
            return Vec::new();
        }

        let lower = clean.to_lowercase();
        if let Some(&(_, expansion)) = ABBREVIATIONS.iter().find(|&&(abbr, _)| abbr == lower) {
            return expansion
                .iter()
                .map(|w| NormalizedForm::new(*w, POS_WORD))
                .collect();
        }

        // Detach one trailing sentence/clause punctuation character
        let (core, tail) = match lower.chars().last() {
            Some(last) if ".?!,:;".contains(last) && lower.chars().count() > 1 => {
                let core: String = lower.chars().take(lower.chars().count() - 1).collect();
                (core, Some(last))
            }
            _ => (lower.clone(), None),
        };

        let mut forms = self.normalize_core(&core, domain);
        if let Some(punct) = tail {
            forms.push(NormalizedForm::new(punct.to_string(), POS_PUNCT));
        }
        forms
    }

    fn normalize_core(&self, core: &str, domain: NormalizationDomain) -> Vec<NormalizedForm> {
        if core.is_empty() {
            return Vec::new();
        }

        if core.chars().all(|c| c.is_ascii_digit()) {
            return Self::digits_to_forms(core, false);
        }

        // Digit range: domain decides between score and interval reading
        if let Some((left, right)) = core.split_once('-')
            && !left.is_empty()
            && !right.is_empty()
            && left.chars().all(|c| c.is_ascii_digit())
            && right.chars().all(|c| c.is_ascii_digit())
        {
            let mut forms = Self::digits_to_forms(left, domain == NormalizationDomain::Sport);
            if domain != NormalizationDomain::Sport {
                forms.push(NormalizedForm::new("til", POS_WORD));
            }
            forms.extend(Self::digits_to_forms(
                right,
                domain == NormalizationDomain::Sport,
            ));
            return forms;
        }

        if core.chars().count() == 1 && core.chars().all(|c| ".?!,:;-".contains(c)) {
            return vec![NormalizedForm::new(core, POS_PUNCT)];
        }

        vec![NormalizedForm::new(core, POS_WORD)]
    }
}

impl Normalizer for RuleNormalizer {
    fn normalize(
        &self,
        tokens: &[String],
        domain: NormalizationDomain,
    ) -> StageResult<Vec<Vec<NormalizedForm>>> {
        Ok(tokens
            .iter()
            .map(|token| self.normalize_token(token, domain))
            .collect())
    }
}
