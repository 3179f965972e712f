//! Fan-out of one identifier across sites.

use futures::stream::{self, StreamExt};
use skuscan_core::{ComparisonResult, Identifier};

use crate::adapter::{LookupPolicy, SiteAdapter};
use crate::client::PageClient;

/// Looks `identifier` up on every adapter and merges the records.
///
/// Up to `policy.max_concurrent_sources` sites are in flight at once.
/// Records come back in adapter order with exactly one record per adapter,
/// and the primary is the first found record. Never fails: a site that
/// errors contributes an error record and its siblings are unaffected.
pub async fn compare(
    client: &PageClient,
    adapters: &[SiteAdapter],
    identifier: &Identifier,
    policy: &LookupPolicy,
) -> ComparisonResult {
    let records = stream::iter(
        adapters
            .iter()
            .map(|adapter| adapter.lookup(client, identifier, policy)),
    )
    .buffered(policy.max_concurrent_sources.max(1))
    .collect::<Vec<_>>()
    .await;

    let result = ComparisonResult::new(identifier.clone(), records);
    tracing::info!(
        %identifier,
        sources = result.records.len(),
        found = result.records.iter().filter(|r| r.is_found()).count(),
        primary = result.primary().map(|r| r.source.as_str()),
        "comparison complete"
    );
    result
}

/// Single-site lookup, wrapped as a one-record comparison.
pub async fn lookup_single(
    client: &PageClient,
    adapter: &SiteAdapter,
    identifier: &Identifier,
    policy: &LookupPolicy,
) -> ComparisonResult {
    let record = adapter.lookup(client, identifier, policy).await;
    ComparisonResult::new(identifier.clone(), vec![record])
}
