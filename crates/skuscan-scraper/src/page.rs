//! Parsed HTML documents.
//!
//! `scraper::Html` is not `Send`, so a [`ProductPage`] is built, inspected,
//! and dropped inside synchronous code; callers never hold one across an
//! `.await`.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use crate::error::ScraperError;
use crate::normalize::clean_text;

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("valid selector"));

/// A fetched and parsed HTML document plus the URL it was served from.
pub struct ProductPage {
    url: Url,
    document: Html,
}

impl ProductPage {
    /// Parses `body` as HTML. `url` is used for resolving relative links.
    ///
    /// HTML parsing itself is lenient; the only hard failures are a blank
    /// body and a URL that is not absolute.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyDocument`] if `body` is empty or whitespace.
    /// - [`ScraperError::InvalidUrl`] if `url` does not parse.
    pub fn parse(url: &str, body: &str) -> Result<Self, ScraperError> {
        let url = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if body.trim().is_empty() {
            return Err(ScraperError::EmptyDocument {
                url: url.to_string(),
            });
        }
        Ok(Self {
            url,
            document: Html::parse_document(body),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Resolves `href` against the page URL.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }

    /// Returns the `content` of the first `<meta>` whose `property` or `name`
    /// equals `key` (ASCII case-insensitive). Blank content counts as absent.
    #[must_use]
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.document
            .select(&META)
            .filter(|meta| {
                let el = meta.value();
                el.attr("property")
                    .or_else(|| el.attr("name"))
                    .is_some_and(|k| k.trim().eq_ignore_ascii_case(key))
            })
            .filter_map(|meta| meta.value().attr("content"))
            .map(clean_text)
            .find(|content| !content.is_empty())
    }

    /// All text under `<body>` with script, style and template contents
    /// left out, whitespace-collapsed.
    #[must_use]
    pub fn body_text(&self) -> String {
        let root = self
            .document
            .select(&BODY)
            .next()
            .unwrap_or_else(|| self.document.root_element());

        let mut text = String::new();
        for node in root.descendants() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|el| {
                    matches!(el.name(), "script" | "style" | "noscript" | "template")
                })
            });
            if !hidden {
                text.push_str(fragment);
            }
        }
        clean_text(&text)
    }
}
