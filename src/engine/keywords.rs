//! Word-boundary keyword matching shared by the classifier and the resolver.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled, case-insensitive set of keywords or short phrases.
///
/// Matches respect word boundaries, tolerate a trailing plural `s` and treat
/// any run of whitespace inside a phrase as a single space. A keyword edge
/// that is punctuation (`c++`, `.net`) is matched without a boundary there.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl KeywordSet {
    /// Compile a keyword list.
    ///
    /// An empty list compiles to a set that never matches.
    ///
    /// # Errors
    /// Returns `PolicyLoad` for blank keywords or a pattern that fails to compile.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let words: Vec<String> = keyword
                .as_ref()
                .split_whitespace()
                .map(|w| w.to_lowercase())
                .collect();
            if words.is_empty() {
                return Err(Error::PolicyLoad("keyword lists must not contain blank entries".into()));
            }
            let joined = words.join(" ");
            if !normalized.contains(&joined) {
                normalized.push(joined);
            }
        }

        if normalized.is_empty() {
            return Ok(Self {
                keywords: normalized,
                pattern: None,
            });
        }

        // Longest first so phrases win over their own prefixes.
        let mut alternatives = normalized.clone();
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let body = alternatives
            .iter()
            .map(|k| alternative(k))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"(?i)(?:{})", body))
            .map_err(|e| Error::PolicyLoad(format!("invalid keyword pattern: {}", e)))?;

        Ok(Self {
            keywords: normalized,
            pattern: Some(pattern),
        })
    }

    /// Number of non-overlapping keyword hits in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.pattern
            .as_ref()
            .map(|p| p.find_iter(text).count())
            .unwrap_or(0)
    }

    /// The first keyword hit in `text`, lowercased.
    pub fn first_match(&self, text: &str) -> Option<String> {
        self.pattern
            .as_ref()
            .and_then(|p| p.find(text))
            .map(|m| m.as_str().to_lowercase())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().map(|p| p.is_match(text)).unwrap_or(false)
    }

    /// The normalized keywords this set was built from.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// One keyword as a regex alternative. `\b` only holds next to a word
/// character, so punctuation edges get no anchor and no plural suffix.
fn alternative(keyword: &str) -> String {
    let body = keyword
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let head = if keyword.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let tail = if keyword.chars().last().is_some_and(is_word_char) {
        r"s?\b"
    } else {
        ""
    };
    format!("{}{}{}", head, body, tail)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
