//! Error types for pubmed-harvest.

use thiserror::Error;

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Errors that can occur while retrieving or persisting records
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The E-utilities endpoint answered with a non-success status
    #[error("remote service returned {status} for {url}: {body}")]
    Remote {
        /// Full request URL, for diagnostics
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Network or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed wire payload (XML that cannot be interpreted)
    #[error("malformed response: {0}")]
    Parse(String),

    /// Failure writing an output artifact
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Identifier list encoding failure
    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),

    /// Archive creation failure
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for HarvestError {
    fn from(err: quick_xml::Error) -> Self {
        HarvestError::Parse(format!("XML: {}", err))
    }
}
