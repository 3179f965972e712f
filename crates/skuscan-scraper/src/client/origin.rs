//! Request context derived from a catalog URL.

use reqwest::Url;

/// Storefront root sent as `Referer`, so a search or product request reads
/// as navigation from the catalog's own home page.
///
/// `https://depofit.com/search?q=48.98721` gives `https://depofit.com`.
/// Only `http`/`https` URLs have one; anything else sends no `Referer`.
#[must_use]
pub fn storefront_origin(url: &Url) -> Option<String> {
    matches!(url.scheme(), "http" | "https").then(|| url.origin().ascii_serialization())
}

/// Catalog host for the `host` log field; empty for host-less URLs.
pub(crate) fn catalog_host(url: &Url) -> &str {
    url.host_str().unwrap_or_default()
}
