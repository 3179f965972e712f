//! Lookup results shared between the scraper and the presentation layer.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Price shown when no extraction strategy produced a price.
pub const PRICE_UNAVAILABLE: &str = "unavailable";
/// Title shown when the product page has no `h1`.
pub const TITLE_PLACEHOLDER: &str = "title not detected";
/// Model shown when no labelled model field exists on the page.
pub const MODEL_PLACEHOLDER: &str = "unspecified";

/// A user-typed or scanned product identifier (SKU, model code, barcode).
///
/// Always trimmed and never empty: an empty needle is a substring of every
/// page and would confirm the first candidate of any search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyIdentifier`] when `raw` is blank.
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which piece of evidence confirmed a candidate page, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Model,
    Title,
    Url,
    /// Identifier appears somewhere in the page body. Weakest signal; can
    /// fire on recommendation widgets that mention another product's code.
    Body,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Model => write!(f, "model"),
            MatchTier::Title => write!(f, "title"),
            MatchTier::Url => write!(f, "url"),
            MatchTier::Body => write!(f, "body"),
        }
    }
}

/// Category of a fault that aborted one site's lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    /// Network, DNS, timeout, or non-success HTTP status.
    Transport,
    /// Unusable document or site configuration.
    Parse,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::Transport => write!(f, "transport"),
            FaultKind::Parse => write!(f, "parse"),
        }
    }
}

/// Fields extracted from a confirmed product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub title: String,
    /// `"<currency> <amount>"`, the page's own price text, or
    /// [`PRICE_UNAVAILABLE`].
    pub price: String,
    pub model: String,
    pub image_url: Option<String>,
    pub matched_by: MatchTier,
}

impl ProductDetails {
    /// Numeric amount parsed out of the price text, if any.
    #[must_use]
    pub fn price_amount(&self) -> Option<Decimal> {
        parse_price_amount(&self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(ProductDetails),
    /// No candidates, or none of the verified candidates matched.
    NotFound,
    Error { kind: FaultKind, message: String },
}

/// One site's answer for one identifier. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Display name of the catalog site.
    pub source: String,
    /// Canonical product URL when found; the site's search URL otherwise, so
    /// the user can continue the search by hand.
    pub url: String,
    #[serde(flatten)]
    pub outcome: LookupOutcome,
}

impl ExtractedRecord {
    #[must_use]
    pub fn found(source: &str, url: String, details: ProductDetails) -> Self {
        Self {
            source: source.to_owned(),
            url,
            outcome: LookupOutcome::Found(details),
        }
    }

    #[must_use]
    pub fn not_found(source: &str, search_url: String) -> Self {
        Self {
            source: source.to_owned(),
            url: search_url,
            outcome: LookupOutcome::NotFound,
        }
    }

    #[must_use]
    pub fn error(source: &str, search_url: String, kind: FaultKind, message: String) -> Self {
        Self {
            source: source.to_owned(),
            url: search_url,
            outcome: LookupOutcome::Error { kind, message },
        }
    }

    #[must_use]
    pub fn details(&self) -> Option<&ProductDetails> {
        match &self.outcome {
            LookupOutcome::Found(details) => Some(details),
            LookupOutcome::NotFound | LookupOutcome::Error { .. } => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.details().is_some()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Error { .. })
    }
}

/// Consolidated answer for one identifier across every configured site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub identifier: Identifier,
    /// One record per site, in site priority order.
    pub records: Vec<ExtractedRecord>,
    /// Index into `records` of the first `Found` record.
    pub primary: Option<usize>,
}

impl ComparisonResult {
    #[must_use]
    pub fn new(identifier: Identifier, records: Vec<ExtractedRecord>) -> Self {
        let primary = records.iter().position(ExtractedRecord::is_found);
        Self {
            identifier,
            records,
            primary,
        }
    }

    #[must_use]
    pub fn primary(&self) -> Option<&ExtractedRecord> {
        self.primary.and_then(|idx| self.records.get(idx))
    }

    /// `true` when every site errored; no site could even be searched.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(ExtractedRecord::is_error)
    }

    /// Per-site price rows with the cheapest parsed amount flagged.
    #[must_use]
    pub fn price_table(&self) -> Vec<PriceRow> {
        let mut rows: Vec<PriceRow> = self
            .records
            .iter()
            .map(|record| {
                let details = record.details();
                PriceRow {
                    source: record.source.clone(),
                    price: details.map(|d| d.price.clone()),
                    amount: details.and_then(ProductDetails::price_amount),
                    cheapest: false,
                }
            })
            .collect();

        let cheapest = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| row.amount.map(|amount| (idx, amount)))
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(idx, _)| idx);
        if let Some(idx) = cheapest {
            rows[idx].cheapest = true;
        }

        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRow {
    pub source: String,
    /// Display price; `None` when the site did not find the product.
    pub price: Option<String>,
    pub amount: Option<Decimal>,
    pub cheapest: bool,
}

/// Pulls the first numeric amount out of display price text.
///
/// Handles `"$1,299.00"`, `"MXN 1299.00"`, and `"1.299,00 €"`: when both
/// separators appear the last one is the decimal point; a lone comma is a
/// decimal point only when followed by exactly two digits.
fn parse_price_amount(text: &str) -> Option<Decimal> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let raw: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let raw = raw.trim_end_matches([',', '.']);

    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');
    let canonical = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (None, Some(comma)) if raw.len() - comma - 1 == 2 => raw.replace(',', "."),
        (None, Some(_)) => raw.replace(',', ""),
        (Some(_), None) if raw.matches('.').count() > 1 => raw.replace('.', ""),
        _ => raw.to_owned(),
    };

    Decimal::from_str(&canonical).ok()
}
