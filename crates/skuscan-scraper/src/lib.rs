pub mod adapter;
pub mod client;
pub mod compare;
pub mod discover;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod page;
mod retry;
pub mod verify;

pub use adapter::{LookupPolicy, SiteAdapter};
pub use client::{FetchedPage, PageClient};
pub use compare::{compare, lookup_single};
pub use discover::{discover, ProductLinkRules};
pub use error::ScraperError;
pub use extract::{extract, ExtractedFields, ExtractionProfile};
pub use normalize::{clean_text, normalize, normalize_opt};
pub use page::ProductPage;
pub use verify::{is_match, match_tier, MatchEvidence, Matcher};
