//! Catalog state and its derived filtered view.

use shared::{domain::Product, error::FetchError};

/// Products whose title contains `query`, ignoring case, in their original order.
pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    if query.is_empty() {
        return products.to_vec();
    }
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| product.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// What a mutation did to the state. Sent to observers alongside a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogChange {
    QueryChanged { query: String },
    ProductsReplaced { count: usize },
    FetchFailed { error: String },
}

impl CatalogChange {
    /// True for the changes that end a fetch.
    pub fn completes_fetch(&self) -> bool {
        matches!(
            self,
            CatalogChange::ProductsReplaced { .. } | CatalogChange::FetchFailed { .. }
        )
    }
}

/// Read-only copy of the catalog handed to consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub query: String,
    pub filtered: Vec<Product>,
    pub last_error: Option<String>,
}

/// Only ever mutated from the store's owner task.
#[derive(Debug, Default)]
pub struct CatalogState {
    products: Vec<Product>,
    query: String,
    filtered: Vec<Product>,
    last_error: Option<String>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> &[Product] {
        &self.filtered
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> CatalogChange {
        self.query = query.into();
        self.recompute();
        CatalogChange::QueryChanged {
            query: self.query.clone(),
        }
    }

    pub fn apply_fetch(&mut self, result: Result<Vec<Product>, FetchError>) -> CatalogChange {
        match result {
            Ok(products) => {
                self.products = products;
                self.last_error = None;
                self.recompute();
                CatalogChange::ProductsReplaced {
                    count: self.products.len(),
                }
            }
            Err(err) => {
                let error = err.describe();
                self.products.clear();
                self.filtered.clear();
                self.last_error = Some(error.clone());
                CatalogChange::FetchFailed { error }
            }
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            products: self.products.clone(),
            query: self.query.clone(),
            filtered: self.filtered.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn recompute(&mut self) {
        self.filtered = filter_products(&self.products, &self.query);
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
