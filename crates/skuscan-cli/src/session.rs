//! Client, adapters and policy for one CLI invocation.

use futures::future::{FutureExt, LocalBoxFuture};
use skuscan_core::{AppConfig, ComparisonResult, Identifier, SitesFile};
use skuscan_scraper::{compare, lookup_single, LookupPolicy, PageClient, SiteAdapter};

pub(crate) struct Session {
    client: PageClient,
    adapters: Vec<SiteAdapter>,
    policy: LookupPolicy,
    single: bool,
}

impl Session {
    /// Every configured site, compared.
    pub(crate) fn all(config: &AppConfig, sites: &SitesFile) -> anyhow::Result<Self> {
        Ok(Self {
            client: PageClient::from_config(config)?,
            adapters: SiteAdapter::from_sites(&sites.sites)?,
            policy: LookupPolicy::from_config(config),
            single: false,
        })
    }

    /// One site, by name or slug; the first configured site when `name` is `None`.
    pub(crate) fn single(
        config: &AppConfig,
        sites: &SitesFile,
        name: Option<&str>,
    ) -> anyhow::Result<Self> {
        let site = match name {
            Some(name) => sites.find(name).ok_or_else(|| {
                anyhow::anyhow!("unknown site '{name}'; run `skuscan sites` to list configured sites")
            })?,
            None => sites
                .sites
                .first()
                .ok_or_else(|| anyhow::anyhow!("no sites configured"))?,
        };
        Ok(Self {
            client: PageClient::from_config(config)?,
            adapters: vec![SiteAdapter::from_config(site)?],
            policy: LookupPolicy::from_config(config),
            single: true,
        })
    }

    pub(crate) fn site_count(&self) -> usize {
        self.adapters.len()
    }

    pub(crate) async fn search(&self, identifier: Identifier) -> ComparisonResult {
        match (self.single, self.adapters.first()) {
            (true, Some(adapter)) => {
                lookup_single(&self.client, adapter, &identifier, &self.policy).await
            }
            _ => compare(&self.client, &self.adapters, &identifier, &self.policy).await,
        }
    }

    /// [`Session::search`] as a boxed future, for the scan loop to hold and drop.
    pub(crate) fn search_boxed(&self, identifier: Identifier) -> LocalBoxFuture<'_, ComparisonResult> {
        self.search(identifier).boxed_local()
    }
}
