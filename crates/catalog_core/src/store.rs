//! Single-owner catalog store.
//!
//! `ProductCatalogStore` runs as a task that owns the `CatalogState`. Every
//! mutation, including the completion of a network fetch, arrives as a message
//! on that task, so observers always run on the owner context.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use shared::{domain::Product, error::FetchError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    config::CatalogSettings,
    source::{HttpProductSource, ProductSource},
    state::{CatalogChange, CatalogSnapshot, CatalogState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Called on the owner task right after each mutation.
pub trait CatalogObserver: Send {
    fn on_change(&self, change: &CatalogChange, snapshot: &CatalogSnapshot);
}

impl<F> CatalogObserver for F
where
    F: Fn(&CatalogChange, &CatalogSnapshot) + Send,
{
    fn on_change(&self, change: &CatalogChange, snapshot: &CatalogSnapshot) {
        self(change, snapshot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEvent {
    pub change: CatalogChange,
    pub snapshot: CatalogSnapshot,
}

/// How a single `refresh` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { count: usize },
    Failed { error: String },
    /// A newer fetch had already been applied when this one finished.
    Superseded,
}

enum StoreCommand {
    SetQuery {
        query: String,
    },
    Fetch {
        done: Option<oneshot::Sender<FetchOutcome>>,
    },
    Snapshot {
        reply: oneshot::Sender<CatalogSnapshot>,
    },
    Subscribe {
        id: SubscriptionId,
        observer: Box<dyn CatalogObserver>,
    },
    Unsubscribe {
        id: SubscriptionId,
    },
}

struct FetchCompletion {
    sequence: u64,
    result: Result<Vec<Product>, FetchError>,
    done: Option<oneshot::Sender<FetchOutcome>>,
}

/// Cheap, cloneable front door to the store task.
#[derive(Clone)]
pub struct CatalogHandle {
    commands: mpsc::UnboundedSender<StoreCommand>,
    events: broadcast::Sender<CatalogEvent>,
    next_subscription: Arc<AtomicU64>,
}

impl CatalogHandle {
    pub fn set_query(&self, query: impl Into<String>) -> Result<()> {
        self.send(StoreCommand::SetQuery {
            query: query.into(),
        })
    }

    /// Fire-and-forget fetch. Overlapping calls are allowed.
    pub fn fetch_products(&self) -> Result<()> {
        self.send(StoreCommand::Fetch { done: None })
    }

    /// Fetches and waits until the result has been applied (or discarded).
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(StoreCommand::Fetch {
            done: Some(done_tx),
        })?;
        done_rx
            .await
            .map_err(|_| anyhow!("catalog store stopped before the fetch completed"))
    }

    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(StoreCommand::Snapshot { reply: reply_tx })?;
        reply_rx
            .await
            .map_err(|_| anyhow!("catalog store stopped before answering"))
    }

    pub fn subscribe(&self, observer: impl CatalogObserver + 'static) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.send(StoreCommand::Subscribe {
            id,
            observer: Box::new(observer),
        })?;
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.send(StoreCommand::Unsubscribe { id })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    fn send(&self, cmd: StoreCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow!("catalog store is no longer running"))
    }
}

pub struct ProductCatalogStore {
    source: Arc<dyn ProductSource>,
    state: CatalogState,
    observers: BTreeMap<SubscriptionId, Box<dyn CatalogObserver>>,
    events: broadcast::Sender<CatalogEvent>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    issued_sequence: u64,
    applied_sequence: u64,
}

impl ProductCatalogStore {
    /// Spawns the store on the current tokio runtime.
    pub fn spawn(source: Arc<dyn ProductSource>, settings: &CatalogSettings) -> CatalogHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(settings.event_buffer.max(1));

        let store = Self {
            source,
            state: CatalogState::new(),
            observers: BTreeMap::new(),
            events: events.clone(),
            completions_tx,
            issued_sequence: 0,
            applied_sequence: 0,
        };

        let handle = CatalogHandle {
            commands: commands_tx,
            events,
            next_subscription: Arc::new(AtomicU64::new(1)),
        };

        if settings.fetch_on_start {
            // Queued before any caller command, so it is always the first fetch.
            let _ = handle.fetch_products();
        }

        tokio::spawn(store.run(commands_rx, completions_rx));
        handle
    }

    pub fn spawn_http(settings: &CatalogSettings) -> CatalogHandle {
        let source = Arc::new(HttpProductSource::new(settings.endpoint_url.clone()));
        Self::spawn(source, settings)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<StoreCommand>,
        mut completions: mpsc::UnboundedReceiver<FetchCompletion>,
    ) {
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
            }
        }
        debug!("catalog store stopped");
    }

    fn handle_command(&mut self, cmd: StoreCommand) {
        match cmd {
            StoreCommand::SetQuery { query } => {
                let change = self.state.set_query(query);
                self.notify(change);
            }
            StoreCommand::Fetch { done } => self.start_fetch(done),
            StoreCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
            StoreCommand::Subscribe { id, observer } => {
                self.observers.insert(id, observer);
            }
            StoreCommand::Unsubscribe { id } => {
                if self.observers.remove(&id).is_none() {
                    debug!(subscription = id.0, "unsubscribe for unknown observer");
                }
            }
        }
    }

    fn start_fetch(&mut self, done: Option<oneshot::Sender<FetchOutcome>>) {
        self.issued_sequence += 1;
        let sequence = self.issued_sequence;
        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        info!(sequence, "fetching product catalog");

        tokio::spawn(async move {
            let result = source.fetch_products().await;
            let _ = completions.send(FetchCompletion {
                sequence,
                result,
                done,
            });
        });
    }

    fn handle_completion(&mut self, completion: FetchCompletion) {
        let FetchCompletion {
            sequence,
            result,
            done,
        } = completion;

        if sequence < self.applied_sequence {
            debug!(
                sequence,
                applied = self.applied_sequence,
                "discarding stale catalog response"
            );
            if let Some(done) = done {
                let _ = done.send(FetchOutcome::Superseded);
            }
            return;
        }
        self.applied_sequence = sequence;

        let outcome = match &result {
            Ok(products) => {
                info!(sequence, count = products.len(), "catalog loaded");
                FetchOutcome::Loaded {
                    count: products.len(),
                }
            }
            Err(err) => {
                warn!(sequence, error = %err, "catalog fetch failed");
                FetchOutcome::Failed {
                    error: err.describe(),
                }
            }
        };
        let change = self.state.apply_fetch(result);

        self.notify(change);
        if let Some(done) = done {
            let _ = done.send(outcome);
        }
    }

    fn notify(&self, change: CatalogChange) {
        let snapshot = self.state.snapshot();
        for observer in self.observers.values() {
            observer.on_change(&change, &snapshot);
        }
        let _ = self.events.send(CatalogEvent { change, snapshot });
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
