use std::error::Error as _;

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Product, error::FetchError, protocol::decode_product_list};
use tracing::debug;

use crate::config::parse_endpoint;

/// Where the catalog comes from. The store only sees this seam so tests can
/// swap the network out.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError>;
}

pub struct HttpProductSource {
    http: Client,
    endpoint_url: String,
}

impl HttpProductSource {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint_url)
    }

    pub fn with_client(http: Client, endpoint_url: impl Into<String>) -> Self {
        Self {
            http,
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        let url = parse_endpoint(&self.endpoint_url)?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(transport_cause(&err)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = res
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(transport_cause(&err)))?;
        debug!(bytes = body.len(), "catalog response received");

        decode_product_list(&body)
    }
}

/// reqwest's top-level message omits the underlying cause (DNS, refused, ...).
fn transport_cause(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
