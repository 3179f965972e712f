//! Field extraction from a confirmed product page.
//!
//! Every field degrades to a placeholder instead of failing. Price is a
//! strategy chain, first success wins:
//!
//! 1. structured metadata: `product:price:*` / `og:price:*` meta tags, then
//!    JSON-LD `Product.offers`
//! 2. the sale-price element (site-overridable selector)
//! 3. any price-classed element whose short text carries a currency marker
//! 4. [`PRICE_UNAVAILABLE`]

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use serde_json::Value;
use skuscan_core::{
    MatchTier, ProductDetails, SiteConfig, MODEL_PLACEHOLDER, PRICE_UNAVAILABLE,
    TITLE_PLACEHOLDER,
};

use crate::error::ScraperError;
use crate::normalize::clean_text;
use crate::page::ProductPage;

/// Price texts this long or longer are sentences, not prices.
const MAX_PRICE_TEXT_CHARS: usize = 20;

const CURRENCY_MARKERS: [&str; 7] = ["$", "€", "£", "¥", "MXN", "USD", "EUR"];

pub(crate) const DEFAULT_PRICE_SELECTOR: &str = r#"[class*="price"]"#;
pub(crate) const DEFAULT_SALE_PRICE_SELECTOR: &str =
    ".price-item--sale, .sale-price, .price-sale, .special-price, [data-sale-price]";

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static MODEL_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li, tr").expect("valid selector"));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[rel="canonical"][href]"#).expect("valid selector")
});
static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Per-site extraction overrides, with selectors compiled up front.
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    pub model_labels: Vec<String>,
    price: Selector,
    sale_price: Selector,
}

impl ExtractionProfile {
    /// Compiles the site's selector overrides (or the defaults).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if an override is not valid CSS.
    pub fn from_site(site: &SiteConfig) -> Result<Self, ScraperError> {
        let compile = |css: &str| {
            Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
                site: site.name.clone(),
                selector: css.to_owned(),
                reason: e.to_string(),
            })
        };
        Ok(Self {
            model_labels: site
                .model_labels
                .iter()
                .filter(|label| !label.trim().is_empty())
                .cloned()
                .collect(),
            price: compile(site.price_selector.as_deref().unwrap_or(DEFAULT_PRICE_SELECTOR))?,
            sale_price: compile(
                site.sale_price_selector
                    .as_deref()
                    .unwrap_or(DEFAULT_SALE_PRICE_SELECTOR),
            )?,
        })
    }
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self {
            model_labels: vec!["Model".to_owned()],
            price: Selector::parse(DEFAULT_PRICE_SELECTOR).expect("valid selector"),
            sale_price: Selector::parse(DEFAULT_SALE_PRICE_SELECTOR).expect("valid selector"),
        }
    }
}

/// Display fields of a product page, placeholders already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub price: String,
    pub model: String,
    pub image_url: Option<String>,
    pub canonical_url: String,
}

impl ExtractedFields {
    #[must_use]
    pub fn into_details(self, matched_by: MatchTier) -> ProductDetails {
        ProductDetails {
            title: self.title,
            price: self.price,
            model: self.model,
            image_url: self.image_url,
            matched_by,
        }
    }
}

/// Extracts all display fields. Never fails.
#[must_use]
pub fn extract(page: &ProductPage, profile: &ExtractionProfile) -> ExtractedFields {
    ExtractedFields {
        title: extract_title(page).unwrap_or_else(|| TITLE_PLACEHOLDER.to_owned()),
        price: extract_price(page, profile).unwrap_or_else(|| PRICE_UNAVAILABLE.to_owned()),
        model: extract_model(page, &profile.model_labels)
            .unwrap_or_else(|| MODEL_PLACEHOLDER.to_owned()),
        image_url: extract_image(page),
        canonical_url: extract_canonical_url(page),
    }
}

/// Text of the first non-empty `h1`.
#[must_use]
pub fn extract_title(page: &ProductPage) -> Option<String> {
    page.document()
        .select(&H1)
        .map(|h1| clean_text(&h1.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Model text from the first `li` or table row that contains one of
/// `labels`, with the label stripped (`Label:` first, then bare `Label`).
///
/// A label only counts as a whole word: not preceded by a letter, and
/// followed by `:`, whitespace or the end of the row, so a `Modelos` menu
/// entry is not a `Modelo` row. Rows whose nested rows also carry the label
/// are skipped so the innermost row supplies the value. Rows left empty by
/// stripping are skipped too.
#[must_use]
pub fn extract_model(page: &ProductPage, labels: &[String]) -> Option<String> {
    for row in page.document().select(&MODEL_ROWS) {
        let text = row_text(row);
        let Some(label) = labels.iter().find(|label| contains_label(&text, label)) else {
            continue;
        };
        if has_labelled_descendant(row, label) {
            continue;
        }
        let value = text
            .replace(&format!("{label}:"), "")
            .replace(label.as_str(), "");
        let value = value
            .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-')
            .to_owned();
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn has_labelled_descendant(row: ElementRef<'_>, label: &str) -> bool {
    row.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "li" | "tr"))
        .any(|el| contains_label(&row_text(el), label))
}

/// Cell texts joined with spaces so `<th>Estilo</th><td>X</td>` reads as
/// `Estilo X`.
fn row_text(row: ElementRef<'_>) -> String {
    clean_text(&row.text().collect::<Vec<_>>().join(" "))
}

fn contains_label(text: &str, label: &str) -> bool {
    text.match_indices(label).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + label.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic)
            && after.is_none_or(|c| c == ':' || c.is_whitespace())
    })
}

/// Runs the price strategy chain; `None` means every strategy came up empty.
#[must_use]
pub fn extract_price(page: &ProductPage, profile: &ExtractionProfile) -> Option<String> {
    if let Some(price) = meta_price(page) {
        tracing::debug!(url = %page.url(), strategy = "meta", "price extracted");
        return Some(price);
    }
    if let Some(price) = json_ld_price(page) {
        tracing::debug!(url = %page.url(), strategy = "json_ld", "price extracted");
        return Some(price);
    }
    if let Some(price) = page
        .document()
        .select(&profile.sale_price)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
    {
        tracing::debug!(url = %page.url(), strategy = "sale_element", "price extracted");
        return Some(price);
    }
    let price = page
        .document()
        .select(&profile.price)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| looks_like_price(text));
    if price.is_some() {
        tracing::debug!(url = %page.url(), strategy = "price_class", "price extracted");
    }
    price
}

fn looks_like_price(text: &str) -> bool {
    !text.is_empty()
        && text.chars().count() < MAX_PRICE_TEXT_CHARS
        && CURRENCY_MARKERS.iter().any(|marker| text.contains(marker))
}

fn format_price(currency: Option<&str>, amount: &str) -> String {
    match currency {
        Some(currency) => format!("{currency} {amount}"),
        None => amount.to_owned(),
    }
}

fn meta_price(page: &ProductPage) -> Option<String> {
    ["product:price", "og:price"].into_iter().find_map(|prefix| {
        let amount = page.meta_content(&format!("{prefix}:amount"))?;
        let currency = page.meta_content(&format!("{prefix}:currency"));
        Some(format_price(currency.as_deref(), &amount))
    })
}

fn json_ld_price(page: &ProductPage) -> Option<String> {
    for script in page.document().select(&JSON_LD) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            tracing::debug!(url = %page.url(), "skipping unparseable JSON-LD block");
            continue;
        };
        let price = json_ld_items(&value)
            .into_iter()
            .filter(|item| has_type(item, "Product"))
            .find_map(|item| item.get("offers").and_then(offer_price));
        if price.is_some() {
            return price;
        }
    }
    None
}

/// Top-level object, array, and `@graph` members.
fn json_ld_items(value: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut items = top.clone();
    for item in top {
        if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
            items.extend(graph.iter());
        }
    }
    items
}

/// `@type` may be a string or an array of strings.
fn has_type(item: &Value, wanted: &str) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case(wanted),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}

fn offer_price(offers: &Value) -> Option<String> {
    let offers: Vec<&Value> = match offers {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    offers.into_iter().find_map(|offer| {
        let amount = offer
            .get("price")
            .or_else(|| offer.get("lowPrice"))
            .and_then(json_scalar)?;
        let currency = offer.get("priceCurrency").and_then(json_scalar);
        Some(format_price(currency.as_deref(), &amount))
    })
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `og:image`, resolved against the page URL.
#[must_use]
pub fn extract_image(page: &ProductPage) -> Option<String> {
    let content = page.meta_content("og:image")?;
    page.resolve(&content).map(String::from)
}

/// `link[rel=canonical]`, else `og:url`, else the page URL itself.
#[must_use]
pub fn extract_canonical_url(page: &ProductPage) -> String {
    page.document()
        .select(&CANONICAL)
        .filter_map(|link| link.value().attr("href"))
        .find(|href| !href.trim().is_empty())
        .map(str::to_owned)
        .or_else(|| page.meta_content("og:url"))
        .and_then(|href| page.resolve(&href))
        .map_or_else(|| page.url().to_string(), String::from)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
