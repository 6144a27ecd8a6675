//! Glue between the store and whatever draws the catalog.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    state::{CatalogChange, CatalogSnapshot},
    store::{CatalogHandle, CatalogObserver, SubscriptionId},
};

/// Implemented by the view layer. Both calls arrive on the store's owner task,
/// so implementations should hand work off rather than block.
pub trait RenderSink: Send {
    fn render(&self, snapshot: &CatalogSnapshot);
    /// A fetch finished (successfully or not); stop any refresh indicator.
    fn refresh_complete(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Render(CatalogSnapshot),
    RefreshComplete,
}

impl RenderSink for mpsc::UnboundedSender<ViewEvent> {
    fn render(&self, snapshot: &CatalogSnapshot) {
        if self.send(ViewEvent::Render(snapshot.clone())).is_err() {
            debug!("view event receiver dropped; skipping render");
        }
    }

    fn refresh_complete(&self) {
        let _ = self.send(ViewEvent::RefreshComplete);
    }
}

struct BindingObserver<S> {
    sink: S,
}

impl<S: RenderSink> CatalogObserver for BindingObserver<S> {
    fn on_change(&self, change: &CatalogChange, snapshot: &CatalogSnapshot) {
        self.sink.render(snapshot);
        if change.completes_fetch() {
            self.sink.refresh_complete();
        }
    }
}

/// Keeps a sink subscribed for as long as it is alive.
pub struct PresentationBinding {
    handle: CatalogHandle,
    subscription: SubscriptionId,
}

impl PresentationBinding {
    pub fn attach(handle: CatalogHandle, sink: impl RenderSink + 'static) -> Result<Self> {
        let subscription = handle.subscribe(BindingObserver { sink })?;
        debug!(subscription = subscription.0, "presentation binding attached");
        Ok(Self {
            handle,
            subscription,
        })
    }

    /// Search-bar text, which may be absent, becomes the store query.
    pub fn update_search_text(&self, raw: Option<&str>) -> Result<()> {
        self.handle.set_query(raw.unwrap_or_default())
    }

    /// Pull-to-refresh.
    pub fn request_refresh(&self) -> Result<()> {
        self.handle.fetch_products()
    }

    pub fn handle(&self) -> &CatalogHandle {
        &self.handle
    }

    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for PresentationBinding {
    fn drop(&mut self) {
        if self.handle.unsubscribe(self.subscription).is_err() {
            debug!("catalog store already stopped while detaching binding");
        }
    }
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
