//! Product catalog client core: fetches the catalog, keeps a live filtered
//! view, and notifies the presentation layer when either changes.

pub mod binding;
pub mod config;
pub mod source;
pub mod state;
pub mod store;

pub use binding::{PresentationBinding, RenderSink, ViewEvent};
pub use config::{load_settings, CatalogSettings};
pub use source::{HttpProductSource, ProductSource};
pub use state::{filter_products, CatalogChange, CatalogSnapshot, CatalogState};
pub use store::{
    CatalogEvent, CatalogHandle, CatalogObserver, FetchOutcome, ProductCatalogStore,
    SubscriptionId,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
