use skuscan_core::FaultKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty document from {url}")]
    EmptyDocument { url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid site \"{site}\": {reason}")]
    InvalidSite { site: String, reason: String },

    #[error("invalid CSS selector \"{selector}\" for site \"{site}\": {reason}")]
    InvalidSelector {
        site: String,
        selector: String,
        reason: String,
    },
}

impl ScraperError {
    /// The user-facing fault category recorded on an errored lookup.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. } => FaultKind::Transport,
            ScraperError::EmptyDocument { .. }
            | ScraperError::InvalidUrl { .. }
            | ScraperError::InvalidSite { .. }
            | ScraperError::InvalidSelector { .. } => FaultKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_transport_faults() {
        let err = ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://depofit.com/search?q=x".to_owned(),
        };
        assert_eq!(err.kind(), FaultKind::Transport);
    }

    #[test]
    fn document_errors_are_parse_faults() {
        let err = ScraperError::EmptyDocument {
            url: "https://depofit.com/products/x".to_owned(),
        };
        assert_eq!(err.kind(), FaultKind::Parse);
        let err = ScraperError::InvalidUrl {
            url: "::".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert_eq!(err.kind(), FaultKind::Parse);
    }
}
