//! Plain-text extraction from HTML markup.

use crate::stages::{StageFailure, StageResult, TextExtractor};

/// Tags whose content is never spoken.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head"];

/// Tags that separate text blocks; replaced by a space so words on either
/// side of a block boundary never merge.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "br", "div", "li", "tr", "td", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Rule-based HTML extractor: strips tags, skips non-spoken elements,
/// decodes the common named entities and collapses whitespace runs.
#[derive(Debug, Clone, Default)]
pub struct HtmlTextExtractor;

impl HtmlTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn decode_entity(entity: &str) -> Option<char> {
        match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => {
                // Numeric entities: &#NNN; and &#xHH;
                let code = entity.strip_prefix("#x").map_or_else(
                    || entity.strip_prefix('#').and_then(|d| d.parse::<u32>().ok()),
                    |h| u32::from_str_radix(h, 16).ok(),
                )?;
                char::from_u32(code)
            }
        }
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, markup: &str) -> StageResult<String> {
        let mut out = String::with_capacity(markup.len());
        let mut chars = markup.chars().peekable();
        let mut skip_until_close: Option<&'static str> = None;

        while let Some(ch) = chars.next() {
            match ch {
                '<' => {
                    let mut tag = String::new();
                    let mut closed = false;
                    for t in chars.by_ref() {
                        if t == '>' {
                            closed = true;
                            break;
                        }
                        tag.push(t);
                    }
                    if !closed {
                        return Err(StageFailure::new("unterminated tag in markup"));
                    }
                    let name = tag
                        .trim_start_matches('/')
                        .split([' ', '\t', '\n', '/'])
                        .next()
                        .unwrap_or("")
                        .to_ascii_lowercase();
                    if let Some(waiting_for) = skip_until_close {
                        if tag.starts_with('/') && name == waiting_for {
                            skip_until_close = None;
                        }
                        continue;
                    }
                    if let Some(&skipped) = SKIPPED_ELEMENTS.iter().find(|&&e| e == name) {
                        if !tag.starts_with('/') && !tag.ends_with('/') {
                            skip_until_close = Some(skipped);
                        }
                    } else if BLOCK_ELEMENTS.contains(&name.as_str()) {
                        out.push(' ');
                    }
                }
                '&' if skip_until_close.is_none() => {
                    let mut entity = String::new();
                    let mut terminated = false;
                    while let Some(&e) = chars.peek() {
                        if e == ';' {
                            chars.next();
                            terminated = true;
                            break;
                        }
                        if e.is_whitespace() || entity.len() > 8 {
                            break;
                        }
                        entity.push(e);
                        chars.next();
                    }
                    match (terminated, Self::decode_entity(&entity)) {
                        (true, Some(decoded)) => out.push(decoded),
                        // Not a recognized entity: keep the literal text
                        _ => {
                            out.push('&');
                            out.push_str(&entity);
                        }
                    }
                }
                _ if skip_until_close.is_some() => {}
                _ => out.push(ch),
            }
        }

        // Collapse whitespace runs introduced by markup
        let mut collapsed = String::with_capacity(out.len());
        let mut last_was_space = true;
        for ch in out.chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    collapsed.push(' ');
                }
                last_was_space = true;
            } else {
                collapsed.push(ch);
                last_was_space = false;
            }
        }
        while collapsed.ends_with(' ') {
            collapsed.pop();
        }
        Ok(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_simple_tags() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor
            .extract("<p>Halló <b>heimur</b></p>")
            .unwrap();
        assert_eq!(text, "Halló heimur");
    }

    #[test]
    fn test_block_tags_separate_words() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor.extract("fyrsta<br/>önnur").unwrap();
        assert_eq!(text, "fyrsta önnur");
    }

    #[test]
    fn test_inline_tags_do_not_separate() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor.extract("sam<i>sett</i>").unwrap();
        assert_eq!(text, "samsett");
    }

    #[test]
    fn test_script_content_is_skipped() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor
            .extract("fyrir <script>var x = 1;</script>eftir")
            .unwrap();
        assert_eq!(text, "fyrir eftir");
    }

    #[test]
    fn test_named_entities_are_decoded() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor.extract("fiskur &amp; franskar").unwrap();
        assert_eq!(text, "fiskur & franskar");
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        let extractor = HtmlTextExtractor::new();
        assert_eq!(extractor.extract("&#243;").unwrap(), "ó");
        assert_eq!(extractor.extract("&#xf3;").unwrap(), "ó");
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor.extract("x &unknown; y").unwrap();
        assert_eq!(text, "x &unknown y");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor
            .extract("<div>  margir\n\n   bilir  </div>")
            .unwrap();
        assert_eq!(text, "margir bilir");
    }

    #[test]
    fn test_unterminated_tag_fails() {
        let extractor = HtmlTextExtractor::new();
        assert!(extractor.extract("brotið <p merki").is_err());
    }

    #[test]
    fn test_plain_text_passes_through() {
        let extractor = HtmlTextExtractor::new();
        let text = extractor.extract("engin merki hér").unwrap();
        assert_eq!(text, "engin merki hér");
    }
}
