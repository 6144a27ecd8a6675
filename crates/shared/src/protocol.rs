use crate::{domain::Product, error::FetchError};

/// Decodes a catalog response body. The whole body is rejected if any element
/// is malformed; valid entries are never salvaged.
pub fn decode_product_list(body: &[u8]) -> Result<Vec<Product>, FetchError> {
    serde_json::from_slice::<Vec<Product>>(body).map_err(|err| FetchError::Decode(err.to_string()))
}
