//! Pipeline orchestrator.
//!
//! Routes each entry point through its stage subset, applies default
//! fallback and the pronunciation-dictionary override, enforces per-stage
//! deadlines, and assembles responses. Collaborators are injected trait
//! objects; the orchestrator holds no mutable state and one ledger exists
//! per call.

use crate::defaults::{DefaultRegistry, PAUSE_TAG, ResolvedNormalize, SENTENCE_TAG};
use crate::error::{FrontendError, Result, StageKind};
use crate::ipc::protocol::{
    G2pRequest, NormalizeRequest, NormalizedResponse, PreprocessRequest, PreprocessedResponse,
    TextCleanRequest, TextCleanResponse,
};
use crate::ledger::{Ledger, NormalizedToken, Span, TokenEntry, TranscribedToken};
use crate::params::{PhonemeDescription, TextCleanerParams};
use crate::pipeline::chunker::{ChunkUnit, plan_boundaries};
use crate::pipeline::postproc;
use crate::stages::cleaner::RuleCleaner;
use crate::stages::extractor::HtmlTextExtractor;
use crate::stages::normalizer::RuleNormalizer;
use crate::stages::phraser::PunctuationPhraser;
use crate::stages::spellchecker::NoopSpellchecker;
use crate::stages::transcriber::RuleTranscriber;
use crate::stages::{CleanedUnit, Cleaner, Normalizer, Phraser, Spellchecker, TextExtractor, Transcriber};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default per-stage deadline.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// The injected stage collaborators.
#[derive(Clone)]
pub struct StageSet {
    pub extractor: Arc<dyn TextExtractor>,
    pub cleaner: Arc<dyn Cleaner>,
    pub normalizer: Arc<dyn Normalizer>,
    pub spellchecker: Arc<dyn Spellchecker>,
    pub phraser: Arc<dyn Phraser>,
    pub transcriber: Arc<dyn Transcriber>,
}

impl StageSet {
    /// The built-in deterministic rule-based stages.
    pub fn reference() -> Self {
        Self {
            extractor: Arc::new(HtmlTextExtractor::new()),
            cleaner: Arc::new(RuleCleaner::new()),
            normalizer: Arc::new(RuleNormalizer::new()),
            spellchecker: Arc::new(NoopSpellchecker::new()),
            phraser: Arc::new(PunctuationPhraser::new()),
            transcriber: Arc::new(RuleTranscriber::new()),
        }
    }

    pub fn with_spellchecker(mut self, spellchecker: Arc<dyn Spellchecker>) -> Self {
        self.spellchecker = spellchecker;
        self
    }
}

/// Per-request orchestration over an injected stage set and the immutable
/// default registry.
pub struct Orchestrator {
    stages: StageSet,
    registry: Arc<DefaultRegistry>,
    stage_timeout: Duration,
}

impl Orchestrator {
    pub fn new(stages: StageSet, registry: Arc<DefaultRegistry>) -> Self {
        Self {
            stages,
            registry,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Sets the per-stage deadline.
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Resolves and validates the request language. The pipeline speaks
    /// one language; anything else is an invalid selection, not a silent
    /// fallback.
    fn check_language(&self, raw: Option<&str>) -> Result<()> {
        let language = self.registry.resolve_language(raw.unwrap_or(""));
        if language != self.registry.language_code() {
            return Err(FrontendError::InvalidArgument {
                message: format!("unsupported language code: {}", language),
            });
        }
        Ok(())
    }

    /// Runs one blocking collaborator call under the stage deadline.
    fn run_stage<T>(
        &self,
        stage: StageKind,
        f: impl FnOnce() -> crate::stages::StageResult<T>,
    ) -> Result<T> {
        let started = Instant::now();
        let output = f().map_err(|e| FrontendError::Stage {
            stage,
            message: e.to_string(),
        })?;
        if started.elapsed() > self.stage_timeout {
            return Err(FrontendError::StageTimeout {
                stage,
                timeout_ms: self.stage_timeout.as_millis() as u64,
            });
        }
        Ok(output)
    }

    // ── Entry points ────────────────────────────────────────────────────

    /// Clean: cleaner only. One processed string, no sentence detection.
    pub fn clean(&self, request: &TextCleanRequest) -> Result<TextCleanResponse> {
        self.check_language(request.language_code.as_deref())?;
        let params = self.registry.resolve_cleaner(request.cleaner_params.as_ref());
        let text = self.extracted_text(request.parse_html, &request.content)?;
        let ledger = self.run_cleaner(&text, &params)?;
        let processed_content =
            render_clean_content(&ledger, request.no_tag_tokens_in_content);
        Ok(TextCleanResponse {
            processed_content,
            tokens: ledger.into_token_list(),
        })
    }

    /// Normalize: cleaner, optional spellchecker, normalizer, optional
    /// phraser, optional sentence splitting.
    pub fn normalize(&self, request: &NormalizeRequest) -> Result<NormalizedResponse> {
        self.check_language(request.language_code.as_deref())?;
        let options = self.registry.resolve_options(&request.options);
        let params = self.registry.resolve_cleaner(request.cleaner_params.as_ref());
        let text = self.extracted_text(request.parse_html, &request.content)?;
        let mut ledger = self.run_cleaner(&text, &params)?;
        self.run_normalize_stages(&mut ledger, options)?;
        let processed_content = assemble_chunks(
            &ledger,
            request.no_tag_tokens_in_content,
            ContentSource::Normalized,
            "",
        );
        Ok(NormalizedResponse {
            processed_content,
            tokens: ledger.into_token_list(),
        })
    }

    /// Transcribe: transcriber only over pre-normalized input; the clean
    /// and normalize histories stay unpopulated.
    pub fn transcribe(&self, request: &G2pRequest) -> Result<PreprocessedResponse> {
        self.check_language(request.language_code.as_deref())?;
        let description = self
            .registry
            .resolve_description(request.description.as_ref())?;
        let mut ledger = Ledger::new(&request.content);
        for (word, span) in whitespace_tokens(&request.content) {
            ledger.append_token(&word, span)?;
        }

        for index in ledger.token_indices() {
            let word = match ledger.get(index).and_then(TokenEntry::as_token) {
                Some(token) => token.name.clone(),
                None => continue,
            };
            if !word.chars().any(char::is_alphabetic) {
                continue;
            }
            let phonetic =
                self.transcribe_word(&word, &description, &request.pronunciation_dict)?;
            ledger.record_transcribed(
                index,
                vec![TranscribedToken {
                    phonetic,
                    description: description.clone(),
                }],
            )?;
        }

        let processed_content = assemble_chunks(
            &ledger,
            false,
            ContentSource::Transcribed,
            &description.word_separator,
        );
        Ok(PreprocessedResponse {
            processed_content,
            tokens: ledger.into_token_list(),
        })
    }

    /// Preprocess: the full pipeline.
    pub fn preprocess(&self, request: &PreprocessRequest) -> Result<PreprocessedResponse> {
        self.check_language(request.language_code.as_deref())?;
        let options = self.registry.resolve_options(&request.options);
        let params = self.registry.resolve_cleaner(request.cleaner_params.as_ref());
        let description = self
            .registry
            .resolve_description(request.description.as_ref())?;
        let text = self.extracted_text(request.parse_html, &request.content)?;

        let mut ledger = self.run_cleaner(&text, &params)?;
        self.run_normalize_stages(&mut ledger, options)?;

        for index in ledger.token_indices() {
            let forms: Vec<String> = match ledger.get(index).and_then(TokenEntry::as_token) {
                Some(token) => token
                    .normalized
                    .iter()
                    .map(|n| n.normalized.clone())
                    .collect(),
                None => continue,
            };
            let mut transcribed = Vec::new();
            for form in forms {
                if !form.chars().any(char::is_alphabetic) {
                    continue;
                }
                let phonetic =
                    self.transcribe_word(&form, &description, &request.pronunciation_dict)?;
                transcribed.push(TranscribedToken {
                    phonetic,
                    description: description.clone(),
                });
            }
            if !transcribed.is_empty() {
                ledger.record_transcribed(index, transcribed)?;
            }
        }

        let processed_content = assemble_chunks(
            &ledger,
            request.no_tag_tokens_in_content,
            ContentSource::Transcribed,
            &description.word_separator,
        );
        Ok(PreprocessedResponse {
            processed_content,
            tokens: ledger.into_token_list(),
        })
    }

    // ── Stage composition ───────────────────────────────────────────────

    fn extracted_text(&self, parse_html: bool, content: &str) -> Result<String> {
        if !parse_html {
            return Ok(content.to_string());
        }
        // Spans reported downstream index into this extracted text.
        self.run_stage(StageKind::Extractor, || {
            self.stages.extractor.extract(content)
        })
    }

    fn run_cleaner(&self, text: &str, params: &TextCleanerParams) -> Result<Ledger> {
        let units = self.run_stage(StageKind::Cleaner, || {
            self.stages.cleaner.clean(text, params)
        })?;
        let mut ledger = Ledger::new(text);
        for unit in units {
            match unit {
                CleanedUnit::Word {
                    original,
                    span,
                    clean,
                    sub_tokens,
                } => {
                    let index = ledger.append_token(&original, span)?;
                    ledger.record_cleaned(index, &clean, sub_tokens)?;
                }
                CleanedUnit::Tag {
                    name,
                    ssml_start,
                    ssml_end,
                } => {
                    ledger.append_tag(&name, ssml_start, ssml_end);
                }
            }
        }
        Ok(ledger)
    }

    /// Spellcheck (optional), normalize, phrase (optional), sentence-split
    /// (optional) over an already-cleaned ledger.
    fn run_normalize_stages(
        &self,
        ledger: &mut Ledger,
        options: ResolvedNormalize,
    ) -> Result<()> {
        let token_ids = ledger.token_indices();
        let clean_forms: Vec<String> = token_ids
            .iter()
            .map(|&id| {
                ledger
                    .get(id)
                    .and_then(TokenEntry::as_token)
                    .map(|t| t.clean.clone())
                    .unwrap_or_default()
            })
            .collect();

        let corrections: Vec<(String, bool)> = if options.do_spellcorrect {
            self.run_stage(StageKind::Spellchecker, || {
                clean_forms
                    .iter()
                    .map(|form| {
                        self.stages
                            .spellchecker
                            .correct(form)
                            .map(|c| (c.corrected, c.changed))
                    })
                    .collect()
            })?
        } else {
            clean_forms.iter().map(|f| (f.clone(), false)).collect()
        };

        let corrected: Vec<String> = corrections.iter().map(|(form, _)| form.clone()).collect();
        let normalized = self.run_stage(StageKind::Normalizer, || {
            self.stages.normalizer.normalize(&corrected, options.domain)
        })?;
        if normalized.len() != token_ids.len() {
            return Err(FrontendError::Stage {
                stage: StageKind::Normalizer,
                message: format!(
                    "returned {} token lists for {} tokens",
                    normalized.len(),
                    token_ids.len()
                ),
            });
        }

        for ((&id, forms), (_, changed)) in
            token_ids.iter().zip(normalized).zip(corrections.iter())
        {
            let records: Vec<NormalizedToken> = forms
                .into_iter()
                .map(|form| NormalizedToken {
                    normalized: form.normalized,
                    pos: form.pos,
                    spell_corrected: *changed,
                    domain: options.domain,
                })
                .collect();
            ledger.record_normalized(id, records)?;
        }

        let mut phrase_breaks: Vec<usize> = Vec::new();
        if options.phrasing {
            let token_strings: Vec<String> = token_ids
                .iter()
                .map(|&id| joined_normalized(ledger, id))
                .collect();
            let breaks = self.run_stage(StageKind::Phraser, || {
                self.stages.phraser.phrase(&token_strings)
            })?;
            for &position in &breaks {
                let Some(&token_id) = token_ids.get(position) else {
                    return Err(FrontendError::Stage {
                        stage: StageKind::Phraser,
                        message: format!("break position {} out of range", position),
                    });
                };
                ledger.insert_tag_after(token_id, PAUSE_TAG, false, false)?;
            }
            phrase_breaks = breaks;
        }

        if options.sentence_split {
            let units: Vec<ChunkUnit> = token_ids
                .iter()
                .enumerate()
                .map(|(position, &id)| {
                    let last = last_normalized(ledger, id);
                    ChunkUnit {
                        token_id: id,
                        sentence_end: matches!(last.as_deref(), Some("." | "?" | "!")),
                        acceptable_break: matches!(last.as_deref(), Some("," | ";" | ":"))
                            || phrase_breaks.contains(&position),
                    }
                })
                .collect();
            for token_id in plan_boundaries(&units, options.max_chunk_tokens) {
                ledger.insert_tag_after(token_id, SENTENCE_TAG, false, false)?;
            }
        }

        Ok(())
    }

    /// Dictionary override with uniform post-processing: an exact match on
    /// the normalized string replaces model inference, then the same
    /// syllabification/stress formatting runs over either source.
    fn transcribe_word(
        &self,
        word: &str,
        description: &PhonemeDescription,
        dictionary: &HashMap<String, String>,
    ) -> Result<String> {
        let plain = match dictionary.get(word) {
            Some(entry) => entry.clone(),
            None => self.run_stage(StageKind::Transcriber, || {
                self.stages.transcriber.transcribe(word, description)
            })?,
        };
        Ok(postproc::apply(&plain, description))
    }
}

// ── Content assembly ────────────────────────────────────────────────────

enum ContentSource {
    Normalized,
    Transcribed,
}

fn joined_normalized(ledger: &Ledger, index: usize) -> String {
    ledger
        .get(index)
        .and_then(TokenEntry::as_token)
        .map(|t| {
            t.normalized
                .iter()
                .map(|n| n.normalized.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn last_normalized(ledger: &Ledger, index: usize) -> Option<String> {
    ledger
        .get(index)
        .and_then(TokenEntry::as_token)
        .and_then(|t| t.normalized.last())
        .map(|n| n.normalized.clone())
}

fn render_tag(tag: &crate::ledger::TagToken) -> String {
    if tag.ssml_start {
        format!("<{}>", tag.name)
    } else if tag.ssml_end {
        format!("</{}>", tag.name)
    } else {
        format!("<{}/>", tag.name)
    }
}

/// Single processed string for the clean entry point.
fn render_clean_content(ledger: &Ledger, no_tags: bool) -> String {
    let mut words: Vec<String> = Vec::new();
    for entry in ledger.iter() {
        match entry {
            TokenEntry::Token(token) => {
                if !token.clean.is_empty() {
                    words.push(token.clean.clone());
                }
            }
            TokenEntry::Tag(tag) => {
                if !no_tags {
                    words.push(render_tag(tag));
                }
            }
        }
    }
    words.join(" ")
}

/// Processed-content chunks for normalize/preprocess/transcribe. Sentence
/// tags delimit chunks and are never rendered inline; other tags render
/// unless suppressed.
fn assemble_chunks(
    ledger: &Ledger,
    no_tags: bool,
    source: ContentSource,
    word_separator: &str,
) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut words: Vec<String> = Vec::new();

    let mut flush = |words: &mut Vec<String>| {
        if !words.is_empty() {
            let joiner = if word_separator.is_empty() {
                " ".to_string()
            } else {
                format!(" {} ", word_separator)
            };
            chunks.push(words.join(&joiner));
            words.clear();
        }
    };

    for entry in ledger.iter() {
        match entry {
            TokenEntry::Token(token) => match source {
                ContentSource::Normalized => {
                    words.extend(token.normalized.iter().map(|n| n.normalized.clone()));
                }
                ContentSource::Transcribed => {
                    words.extend(token.transcribed.iter().map(|t| t.phonetic.clone()));
                }
            },
            TokenEntry::Tag(tag) => {
                if tag.name == SENTENCE_TAG {
                    flush(&mut words);
                } else if !no_tags {
                    words.push(render_tag(tag));
                }
            }
        }
    }
    flush(&mut words);
    chunks
}

/// Whitespace tokenization with character spans, for the transcribe entry
/// point where no cleaner runs.
fn whitespace_tokens(text: &str) -> Vec<(String, Span)> {
    let mut tokens = Vec::new();
    let mut char_pos = 0usize;
    let mut start = 0usize;
    let mut word = String::new();
    for ch in text.chars().chain(std::iter::once(' ')) {
        if ch.is_whitespace() {
            if !word.is_empty() {
                tokens.push((std::mem::take(&mut word), Span::new(start, char_pos)));
            }
        } else {
            if word.is_empty() {
                start = char_pos;
            }
            word.push(ch);
        }
        char_pos += 1;
    }
    tokens
}
