//! Candidate discovery: product links on a search-results page.

use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

static CONTENT_REGION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"main, [role="main"], #MainContent, #main-content, #content"#)
        .expect("valid selector")
});
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// What makes a URL on a given site a product page.
#[derive(Debug, Clone)]
pub struct ProductLinkRules {
    /// Path fragments such as `/products/` (compared case-insensitively).
    pub path_patterns: Vec<String>,
    /// Query keys that carry a product id, such as `variant` or `pid`.
    pub query_params: Vec<String>,
}

impl ProductLinkRules {
    #[must_use]
    pub fn is_product_link(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        if self
            .path_patterns
            .iter()
            .any(|pattern| path.contains(&pattern.to_lowercase()))
        {
            return true;
        }
        url.query_pairs().any(|(key, value)| {
            !value.is_empty()
                && self
                    .query_params
                    .iter()
                    .any(|param| key.eq_ignore_ascii_case(param))
        })
    }
}

/// Collects candidate product URLs from a search-results document.
///
/// Links inside the first primary content region are scanned; if that region
/// is missing or yields no product links the whole document is scanned
/// instead. Relative hrefs resolve against `base_url`. Results are
/// canonicalized (see [`canonicalize`]), de-duplicated, and kept in
/// first-seen order. Never fails; an empty vector means no candidates.
#[must_use]
pub fn discover(document: &Html, base_url: &Url, rules: &ProductLinkRules) -> Vec<String> {
    if let Some(region) = document.select(&CONTENT_REGION).next() {
        let found = collect_links(region, base_url, rules);
        if !found.is_empty() {
            return found;
        }
        tracing::debug!(
            base_url = %base_url,
            "content region had no product links, scanning whole document"
        );
    }
    collect_links(document.root_element(), base_url, rules)
}

fn collect_links(scope: ElementRef<'_>, base_url: &Url, rules: &ProductLinkRules) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in scope.select(&LINKS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base_url.join(href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") || !rules.is_product_link(&resolved) {
            continue;
        }
        let canonical = canonicalize(resolved);
        if seen.insert(canonical.clone()) {
            candidates.push(canonical);
        }
    }

    candidates
}

/// Drops the fragment and storefront tracking parameters (query keys
/// starting with `_`, e.g. `_pos`, `_sid`, `_ss`) from a product URL.
#[must_use]
pub fn canonicalize(mut url: Url) -> String {
    url.set_fragment(None);

    let has_tracking = url.query_pairs().any(|(key, _)| key.starts_with('_'));
    if has_tracking {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !key.starts_with('_'))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    } else if url.query() == Some("") {
        url.set_query(None);
    }

    url.to_string()
}
