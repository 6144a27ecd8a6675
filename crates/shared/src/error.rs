use thiserror::Error;

/// Every way a catalog fetch can fail. Consumers only ever see the rendered
/// text; the variants exist for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid catalog endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("{0}")]
    Transport(String),
    #[error("bad server response (HTTP {status})")]
    Status { status: u16 },
    #[error("could not decode product list: {0}")]
    Decode(String),
}

impl FetchError {
    /// Human-readable description stored as the catalog's last error.
    pub fn describe(&self) -> String {
        format!("Failed to fetch products: {self}")
    }
}
