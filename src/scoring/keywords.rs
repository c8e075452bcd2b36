//! Keyword coverage over plain text.
//!
//! The text is stripped of HTML markup, lower-cased and whitespace-collapsed. Each keyword is
//! then looked up as a whole word: the characters immediately around the match must not be
//! letters, digits or `_`. Keywords ending in `s` fall back to their singular form.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::types::KeywordCoverage;
use crate::hashing::normalize_text;

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("script/style pattern is valid")
});

static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").expect("tag pattern is valid"));

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]{2,8});")
        .expect("entity pattern is valid")
});

/// Removes HTML tags, comments and script/style blocks and decodes common entities.
///
/// Tags become spaces so adjacent words do not merge. Text without markup is returned as is.
pub fn strip_markup(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return text.to_string();
    }

    let without_blocks = SCRIPT_STYLE_RE.replace_all(text, " ");
    let without_comments = COMMENT_RE.replace_all(&without_blocks, " ");
    let without_tags = TAG_RE.replace_all(&without_comments, " ");

    ENTITY_RE
        .replace_all(&without_tags, |caps: &Captures<'_>| decode_entity(&caps[1], &caps[0]))
        .into_owned()
}

fn decode_entity(name: &str, raw: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };

    decoded.map_or_else(|| raw.to_string(), String::from)
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `true` if `needle` occurs in `haystack` with no word character on either side.
///
/// Both inputs are expected to be normalized already.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    // Overlapping candidates matter: in "xa a a" the rejected hit at 1 hides the valid one at 3.
    let step = needle.chars().next().map_or(1, char::len_utf8);
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c));
        let after_ok = haystack[start + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }
        from = start + step;
    }
    false
}

/// Splits keywords into those present in a text and those missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCoverageAnalyzer;

impl KeywordCoverageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates every keyword against `text`.
    ///
    /// Keywords that are empty after trimming are skipped and not counted. Duplicates are
    /// evaluated independently. `covered` and `missed` keep input order and the trimmed
    /// keyword's original casing.
    pub fn analyze<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> KeywordCoverage {
        let haystack = normalize_text(&strip_markup(text));

        let mut covered = Vec::new();
        let mut missed = Vec::new();

        for keyword in keywords {
            let trimmed = keyword.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }

            if Self::matches(&haystack, &normalize_text(trimmed)) {
                covered.push(trimmed.to_string());
            } else {
                missed.push(trimmed.to_string());
            }
        }

        debug!(
            text_len = text.len(),
            covered = covered.len(),
            missed = missed.len(),
            "Analyzed keyword coverage"
        );

        KeywordCoverage::from_partition(covered, missed)
    }

    /// Literal whole-word match, then the singular form for keywords ending in `s`.
    fn matches(haystack: &str, needle: &str) -> bool {
        if contains_whole_word(haystack, needle) {
            return true;
        }

        match needle.strip_suffix('s') {
            Some(singular) if !singular.is_empty() => contains_whole_word(haystack, singular),
            _ => false,
        }
    }
}
