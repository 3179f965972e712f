//! Match verification: does a candidate page describe the identifier?
//!
//! Evidence is tested strongest first (model field, title, URL, body text)
//! and the first satisfied tier wins. All text goes through
//! [`crate::normalize::normalize`] before comparison.

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Url;
use skuscan_core::{Identifier, MatchMode, MatchTier};

use crate::normalize::{normalize, normalize_opt};

/// The page evidence a candidate is judged on.
#[derive(Debug, Clone, Copy)]
pub struct MatchEvidence<'a> {
    pub model: Option<&'a str>,
    pub title: Option<&'a str>,
    pub url: &'a str,
    pub body: &'a str,
}

/// A compiled identifier matcher.
///
/// In [`MatchMode::Tolerant`] each separator run in the identifier becomes
/// `[-.\s]?`, so the separator may be any one of `-`, `.`, whitespace, or be
/// missing entirely.
#[derive(Debug, Clone)]
pub struct Matcher {
    needle: String,
    pattern: Option<Regex>,
}

impl Matcher {
    #[must_use]
    pub fn new(identifier: &Identifier, mode: MatchMode) -> Self {
        let needle = normalize(identifier.as_str());
        let pattern = match mode {
            MatchMode::Exact => None,
            MatchMode::Tolerant => tolerant_pattern(&needle),
        };
        Self { needle, pattern }
    }

    /// Substring test on normalized text.
    #[must_use]
    pub fn found_in(&self, text: &str) -> bool {
        let haystack = normalize(text);
        if haystack.is_empty() {
            return false;
        }
        match &self.pattern {
            Some(re) => re.is_match(&haystack),
            None => haystack.contains(&self.needle),
        }
    }

    /// Returns the strongest tier of `evidence` that contains the identifier.
    #[must_use]
    pub fn match_tier(&self, evidence: &MatchEvidence<'_>) -> Option<MatchTier> {
        if self.found_in(&normalize_opt(evidence.model)) {
            return Some(MatchTier::Model);
        }
        if self.found_in(&normalize_opt(evidence.title)) {
            return Some(MatchTier::Title);
        }
        if self.found_in(&decoded_path_and_query(evidence.url)) {
            return Some(MatchTier::Url);
        }
        if self.found_in(evidence.body) {
            return Some(MatchTier::Body);
        }
        None
    }

    #[must_use]
    pub fn is_match(&self, evidence: &MatchEvidence<'_>) -> bool {
        self.match_tier(evidence).is_some()
    }
}

/// One-shot form of [`Matcher::match_tier`].
#[must_use]
pub fn match_tier(
    identifier: &Identifier,
    mode: MatchMode,
    evidence: &MatchEvidence<'_>,
) -> Option<MatchTier> {
    Matcher::new(identifier, mode).match_tier(evidence)
}

/// One-shot form of [`Matcher::is_match`].
#[must_use]
pub fn is_match(identifier: &Identifier, mode: MatchMode, evidence: &MatchEvidence<'_>) -> bool {
    match_tier(identifier, mode, evidence).is_some()
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '.' || c.is_whitespace()
}

/// Builds the tolerant regex for a normalized needle. `None` when the
/// needle has no non-separator content, in which case exact containment
/// applies.
fn tolerant_pattern(needle: &str) -> Option<Regex> {
    let tokens: Vec<String> = needle
        .split(is_separator)
        .filter(|token| !token.is_empty())
        .map(regex::escape)
        .collect();
    if tokens.is_empty() {
        return None;
    }
    match Regex::new(&tokens.join(r"[-.\s]?")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(needle, error = %e, "tolerant pattern rejected, using exact match");
            None
        }
    }
}

/// The percent-decoded path and query of `url`, or `url` itself when it
/// does not parse.
fn decoded_path_and_query(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_owned();
    };
    let mut raw = parsed.path().to_owned();
    if let Some(query) = parsed.query() {
        raw.push('?');
        raw.push_str(query);
    }
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}
