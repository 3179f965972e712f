//! One catalog site: search, discover, verify, extract.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use skuscan_core::{
    AppConfig, ExtractedRecord, Identifier, MatchMode, ProductDetails, SiteConfig,
};

use crate::client::{FetchedPage, PageClient};
use crate::discover::{canonicalize, discover, ProductLinkRules};
use crate::error::ScraperError;
use crate::extract::{extract, extract_model, extract_title, ExtractionProfile};
use crate::page::ProductPage;
use crate::verify::{MatchEvidence, Matcher};

/// Unreserved characters (RFC 3986) stay literal in search queries.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const QUERY_PLACEHOLDER: &str = "{query}";

/// Limits shared by every adapter invocation of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Discovered candidates fetched and verified per site, in order.
    pub max_candidates: usize,
    pub match_mode: MatchMode,
    /// Sites queried at the same time during a comparison.
    pub max_concurrent_sources: usize,
}

impl LookupPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            match_mode: config.match_mode,
            max_concurrent_sources: config.max_concurrent_sources,
        }
    }
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            max_candidates: 3,
            match_mode: MatchMode::Tolerant,
            max_concurrent_sources: 4,
        }
    }
}

struct Candidate {
    url: String,
    /// Body already in hand when the search redirected straight to this page.
    prefetched: Option<String>,
}

/// Lookup against one catalog site, built from its [`SiteConfig`].
///
/// Only URL conventions and extraction overrides differ between sites; the
/// discovery, verification, and extraction algorithms are shared.
#[derive(Debug, Clone)]
pub struct SiteAdapter {
    name: String,
    base_url: Url,
    search_template: String,
    links: ProductLinkRules,
    profile: ExtractionProfile,
}

impl SiteAdapter {
    /// Validates `site` and compiles its selectors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidSite`] for a non-http(s) base URL, a search
    ///   template without `{query}` or one that does not form a valid URL,
    ///   or a site with no way to recognize product links.
    /// - [`ScraperError::InvalidSelector`] for a price selector override that
    ///   is not valid CSS.
    pub fn from_config(site: &SiteConfig) -> Result<Self, ScraperError> {
        let invalid = |reason: String| ScraperError::InvalidSite {
            site: site.name.clone(),
            reason,
        };

        let base_url = Url::parse(site.base_url.trim())
            .map_err(|e| invalid(format!("base_url: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "base_url must be http(s), got scheme \"{}\"",
                base_url.scheme()
            )));
        }

        let search_template = site.search_url.trim().to_owned();
        if !search_template.contains(QUERY_PLACEHOLDER) {
            return Err(invalid(format!(
                "search_url must contain {QUERY_PLACEHOLDER}"
            )));
        }
        Url::parse(&search_template.replace(QUERY_PLACEHOLDER, "probe"))
            .map_err(|e| invalid(format!("search_url: {e}")))?;

        if site.product_path_patterns.is_empty() && site.product_query_params.is_empty() {
            return Err(invalid(
                "needs product_path_patterns or product_query_params".to_owned(),
            ));
        }

        Ok(Self {
            name: site.name.clone(),
            base_url,
            search_template,
            links: ProductLinkRules {
                path_patterns: site.product_path_patterns.clone(),
                query_params: site.product_query_params.clone(),
            },
            profile: ExtractionProfile::from_site(site)?,
        })
    }

    /// Builds adapters for every site, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns the first site's validation error.
    pub fn from_sites(sites: &[SiteConfig]) -> Result<Vec<Self>, ScraperError> {
        sites.iter().map(Self::from_config).collect()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The search-results URL for `identifier`, percent-encoded into the
    /// site's template.
    #[must_use]
    pub fn search_url(&self, identifier: &Identifier) -> String {
        let encoded = utf8_percent_encode(identifier.as_str(), QUERY_ENCODE_SET).to_string();
        self.search_template.replace(QUERY_PLACEHOLDER, &encoded)
    }

    /// Runs one lookup and always yields a record.
    ///
    /// Faults during the search fetch or any candidate fetch turn the whole
    /// record into an error; nothing escapes to the caller.
    pub async fn lookup(
        &self,
        client: &PageClient,
        identifier: &Identifier,
        policy: &LookupPolicy,
    ) -> ExtractedRecord {
        let search_url = self.search_url(identifier);
        tracing::debug!(site = %self.name, %identifier, search_url, "searching site");

        match self.run(client, identifier, policy, &search_url).await {
            Ok(Some((url, details))) => {
                tracing::info!(
                    site = %self.name,
                    %identifier,
                    url,
                    tier = ?details.matched_by,
                    "product found"
                );
                ExtractedRecord::found(&self.name, url, details)
            }
            Ok(None) => {
                tracing::info!(site = %self.name, %identifier, "no verified match");
                ExtractedRecord::not_found(&self.name, search_url)
            }
            Err(e) => {
                tracing::warn!(
                    site = %self.name,
                    %identifier,
                    kind = %e.kind(),
                    error = %e,
                    "lookup failed"
                );
                ExtractedRecord::error(&self.name, search_url, e.kind(), e.to_string())
            }
        }
    }

    async fn run(
        &self,
        client: &PageClient,
        identifier: &Identifier,
        policy: &LookupPolicy,
        search_url: &str,
    ) -> Result<Option<(String, ProductDetails)>, ScraperError> {
        let results = client.fetch_page(search_url).await?;
        let candidates = self.candidates(results, search_url)?;
        tracing::debug!(
            site = %self.name,
            %identifier,
            candidates = candidates.len(),
            cap = policy.max_candidates,
            "candidates discovered"
        );

        let matcher = Matcher::new(identifier, policy.match_mode);
        for candidate in candidates.into_iter().take(policy.max_candidates) {
            let body = match candidate.prefetched {
                Some(body) => body,
                None => client.fetch_html(&candidate.url).await?,
            };
            if let Some(found) = self.verify(&candidate.url, &body, &matcher)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Candidates from the results page. A search that redirected onto a
    /// product page puts that page first.
    fn candidates(
        &self,
        results: FetchedPage,
        search_url: &str,
    ) -> Result<Vec<Candidate>, ScraperError> {
        let discovered = {
            let page = ProductPage::parse(&results.url, &results.body)?;
            discover(page.document(), &self.base_url, &self.links)
        };

        let requested = Url::parse(search_url).ok();
        let landing = Url::parse(&results.url)
            .ok()
            .filter(|url| Some(url) != requested.as_ref() && self.links.is_product_link(url))
            .map(canonicalize);

        let mut candidates = Vec::with_capacity(discovered.len() + 1);
        if let Some(url) = landing {
            tracing::debug!(site = %self.name, url, "search redirected to a product page");
            candidates.push(Candidate {
                url,
                prefetched: Some(results.body),
            });
        }
        for url in discovered {
            if candidates.iter().all(|c| c.url != url) {
                candidates.push(Candidate {
                    url,
                    prefetched: None,
                });
            }
        }
        Ok(candidates)
    }

    /// Parses a candidate and, if it matches, extracts its fields.
    fn verify(
        &self,
        url: &str,
        body: &str,
        matcher: &Matcher,
    ) -> Result<Option<(String, ProductDetails)>, ScraperError> {
        let page = ProductPage::parse(url, body)?;
        let title = extract_title(&page);
        let model = extract_model(&page, &self.profile.model_labels);
        let body_text = page.body_text();
        let evidence = MatchEvidence {
            model: model.as_deref(),
            title: title.as_deref(),
            url,
            body: &body_text,
        };

        let Some(tier) = matcher.match_tier(&evidence) else {
            tracing::debug!(site = %self.name, url, "candidate rejected");
            return Ok(None);
        };

        let fields = extract(&page, &self.profile);
        let canonical_url = fields.canonical_url.clone();
        Ok(Some((canonical_url, fields.into_details(tier))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, search_url: &str) -> SiteConfig {
        SiteConfig {
            name: name.to_owned(),
            base_url: "https://depofit.com".to_owned(),
            search_url: search_url.to_owned(),
            product_path_patterns: vec!["/products/".to_owned()],
            product_query_params: vec![],
            model_labels: vec!["Modelo".to_owned()],
            price_selector: None,
            sale_price_selector: None,
            notes: None,
        }
    }

    fn depofit() -> SiteAdapter {
        SiteAdapter::from_config(&site(
            "Depofit",
            "https://depofit.com/search?q={query}&type=product",
        ))
        .unwrap()
    }

    #[test]
    fn search_url_substitutes_encoded_identifier() {
        let id = Identifier::new("48.98721").unwrap();
        assert_eq!(
            depofit().search_url(&id),
            "https://depofit.com/search?q=48.98721&type=product"
        );
    }

    #[test]
    fn search_url_encodes_reserved_characters() {
        let id = Identifier::new("HV6341 702&x=1").unwrap();
        assert_eq!(
            depofit().search_url(&id),
            "https://depofit.com/search?q=HV6341%20702%26x%3D1&type=product"
        );
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = SiteAdapter::from_config(&site("Broken", "https://depofit.com/search?q="))
            .unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSite { .. }));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = site("Ftp", "https://depofit.com/search?q={query}");
        config.base_url = "ftp://depofit.com".to_owned();
        let err = SiteAdapter::from_config(&config).unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSite { ref reason, .. } if reason.contains("http")));
    }

    #[test]
    fn rejects_site_without_product_rules() {
        let mut config = site("NoRules", "https://depofit.com/search?q={query}");
        config.product_path_patterns.clear();
        let err = SiteAdapter::from_config(&config).unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSite { .. }));
    }

    #[test]
    fn rejects_invalid_price_selector() {
        let mut config = site("BadCss", "https://depofit.com/search?q={query}");
        config.sale_price_selector = Some("span[".to_owned());
        let err = SiteAdapter::from_config(&config).unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSelector { .. }));
    }

    #[test]
    fn from_sites_keeps_order() {
        let adapters = SiteAdapter::from_sites(&[
            site("B", "https://b.example/search?q={query}"),
            site("A", "https://a.example/search?q={query}"),
        ])
        .unwrap();
        let names: Vec<_> = adapters.iter().map(SiteAdapter::name).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn policy_defaults() {
        let policy = LookupPolicy::default();
        assert_eq!(policy.max_candidates, 3);
        assert_eq!(policy.match_mode, MatchMode::Tolerant);
    }
}
