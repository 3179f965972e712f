//! Catalog site definitions loaded from `config/sites.yaml`.
//!
//! Sites are listed in priority order: the first site that finds a product
//! supplies the primary record of a comparison.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One catalog site. Only URL conventions and extraction overrides vary per
/// site; discovery, verification and extraction are shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Origin used to resolve relative links, e.g. `"https://depofit.com"`.
    pub base_url: String,
    /// Search results URL with a `{query}` placeholder, e.g.
    /// `"https://depofit.com/search?q={query}&type=product"`.
    pub search_url: String,
    /// Path fragments that mark a link as a product page.
    #[serde(default = "default_product_path_patterns")]
    pub product_path_patterns: Vec<String>,
    /// Query parameters that carry a product id (e.g. `"pid"`), for sites
    /// whose product pages are not path-addressed.
    #[serde(default)]
    pub product_query_params: Vec<String>,
    /// Labels that introduce the model field, e.g. `"Modelo"` or `"Estilo"`.
    #[serde(default = "default_model_labels")]
    pub model_labels: Vec<String>,
    /// CSS selector replacing the generic `[class*="price"]` scan.
    #[serde(default)]
    pub price_selector: Option<String>,
    /// CSS selector replacing the built-in sale-price selectors.
    #[serde(default)]
    pub sale_price_selector: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_product_path_patterns() -> Vec<String> {
    vec!["/products/".to_string()]
}

fn default_model_labels() -> Vec<String> {
    vec!["Model".to_string()]
}

impl SiteConfig {
    /// Generate a URL-safe slug from the site name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' || c == '.' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

impl SitesFile {
    /// Finds a site by slug or case-insensitive name.
    #[must_use]
    pub fn find(&self, name_or_slug: &str) -> Option<&SiteConfig> {
        let wanted = name_or_slug.trim();
        self.sites
            .iter()
            .find(|s| s.slug() == wanted || s.name.eq_ignore_ascii_case(wanted))
    }
}

/// Load and validate the site definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sites(&content)
}

/// Parse and validate site definitions from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile = serde_yaml::from_str(content)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    if sites_file.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for site in &sites_file.sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }

        if !(site.base_url.starts_with("https://") || site.base_url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "site '{}' has base_url \"{}\"; must start with http:// or https://",
                site.name, site.base_url
            )));
        }

        if !site.search_url.contains("{query}") {
            return Err(ConfigError::Validation(format!(
                "site '{}' search_url must contain a {{query}} placeholder",
                site.name
            )));
        }

        if site.product_path_patterns.is_empty() && site.product_query_params.is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' needs at least one product_path_patterns or product_query_params entry",
                site.name
            )));
        }

        let blank_entry = site
            .product_path_patterns
            .iter()
            .chain(&site.product_query_params)
            .chain(&site.model_labels)
            .any(|entry| entry.trim().is_empty());
        if blank_entry {
            return Err(ConfigError::Validation(format!(
                "site '{}' has a blank pattern, query param, or model label",
                site.name
            )));
        }

        let lower_name = site.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name: '{}'",
                site.name
            )));
        }

        let slug = site.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site slug: '{}' (from site '{}')",
                slug, site.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
