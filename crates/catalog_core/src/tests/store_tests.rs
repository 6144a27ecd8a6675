use super::*;
use crate::test_support::{product, spawn_catalog_server, unreachable_endpoint};
use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex as StdMutex};
use tokio::sync::Mutex;

type Scripted = (oneshot::Receiver<()>, Result<Vec<Product>, FetchError>);

/// Replays canned responses in call order; each waits on its own gate.
struct ScriptedSource {
    responses: Mutex<VecDeque<Scripted>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    async fn push_ready(&self, result: Result<Vec<Product>, FetchError>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        self.responses.lock().await.push_back((rx, result));
    }

    async fn push_gated(&self, result: Result<Vec<Product>, FetchError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().await.push_back((rx, result));
        tx
    }
}

#[async_trait]
impl ProductSource for ScriptedSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        let next = self.responses.lock().await.pop_front();
        let Some((gate, result)) = next else {
            return Err(FetchError::Transport("no scripted response".into()));
        };
        let _ = gate.await;
        result
    }
}

fn quiet_settings() -> CatalogSettings {
    CatalogSettings {
        fetch_on_start: false,
        ..CatalogSettings::default()
    }
}

fn recording_observer() -> (
    Arc<StdMutex<Vec<CatalogChange>>>,
    impl Fn(&CatalogChange, &CatalogSnapshot) + Send + 'static,
) {
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let observer = move |change: &CatalogChange, _snapshot: &CatalogSnapshot| {
        sink.lock().expect("observer lock").push(change.clone());
    };
    (seen, observer)
}

#[tokio::test]
async fn refresh_loads_products_and_filters_by_current_query() {
    let source = Arc::new(ScriptedSource::new());
    source
        .push_ready(Ok(vec![product(1, "Smartphone"), product(2, "Laptop")]))
        .await;
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());

    handle.set_query("phone").expect("set query");
    let outcome = handle.refresh().await.expect("refresh");
    assert_eq!(outcome, FetchOutcome::Loaded { count: 2 });

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.products.len(), 2);
    assert_eq!(snapshot.filtered, vec![product(1, "Smartphone")]);
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test]
async fn failed_refresh_empties_catalog() {
    let source = Arc::new(ScriptedSource::new());
    source.push_ready(Ok(vec![product(1, "Smartphone")])).await;
    source
        .push_ready(Err(FetchError::Status { status: 503 }))
        .await;
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());

    handle.refresh().await.expect("first refresh");
    let outcome = handle.refresh().await.expect("second refresh");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(snapshot.products.is_empty());
    assert!(snapshot.filtered.is_empty());
    let error = snapshot.last_error.expect("error recorded");
    assert!(error.starts_with("Failed to fetch products: "));
    assert_eq!(outcome, FetchOutcome::Failed { error });
}

#[tokio::test]
async fn observers_hear_each_completed_fetch_exactly_once() {
    let source = Arc::new(ScriptedSource::new());
    source.push_ready(Ok(vec![product(1, "A")])).await;
    source
        .push_ready(Err(FetchError::Transport("down".into())))
        .await;
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());
    let (seen, observer) = recording_observer();
    handle.subscribe(observer).expect("subscribe");

    handle.refresh().await.expect("refresh");
    handle.refresh().await.expect("refresh");

    let seen = seen.lock().expect("lock").clone();
    assert_eq!(
        seen,
        vec![
            CatalogChange::ProductsReplaced { count: 1 },
            CatalogChange::FetchFailed {
                error: "Failed to fetch products: down".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn query_changes_notify_observers_and_event_stream() {
    let source = Arc::new(ScriptedSource::new());
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());
    let (seen, observer) = recording_observer();
    handle.subscribe(observer).expect("subscribe");
    let mut events = handle.subscribe_events();

    handle.set_query("lamp").expect("set query");
    let event = events.recv().await.expect("event");

    assert_eq!(
        event.change,
        CatalogChange::QueryChanged {
            query: "lamp".to_string()
        }
    );
    assert_eq!(event.snapshot.query, "lamp");
    assert_eq!(seen.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn unsubscribed_observer_is_not_called() {
    let source = Arc::new(ScriptedSource::new());
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());
    let (seen, observer) = recording_observer();
    let id = handle.subscribe(observer).expect("subscribe");

    handle.set_query("a").expect("set query");
    handle.unsubscribe(id).expect("unsubscribe");
    handle.set_query("b").expect("set query");
    handle.snapshot().await.expect("barrier");

    assert_eq!(seen.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn older_response_arriving_late_is_discarded() {
    let source = Arc::new(ScriptedSource::new());
    let first_gate = source.push_gated(Ok(vec![product(1, "Old")])).await;
    let second_gate = source.push_gated(Ok(vec![product(2, "New")])).await;
    let handle = ProductCatalogStore::spawn(source, &quiet_settings());
    let mut events = handle.subscribe_events();

    let (first, second, ()) = tokio::join!(handle.refresh(), handle.refresh(), async {
        second_gate.send(()).expect("release second");
        let event = events.recv().await.expect("event");
        assert_eq!(event.change, CatalogChange::ProductsReplaced { count: 1 });
        first_gate.send(()).expect("release first");
    });

    assert_eq!(first.expect("first"), FetchOutcome::Superseded);
    assert_eq!(second.expect("second"), FetchOutcome::Loaded { count: 1 });
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.products, vec![product(2, "New")]);
}

#[tokio::test]
async fn fetch_on_start_issues_initial_request() {
    let base = spawn_catalog_server().await.expect("spawn server");
    let settings = CatalogSettings {
        endpoint_url: format!("{base}/products"),
        ..CatalogSettings::default()
    };
    let handle = ProductCatalogStore::spawn_http(&settings);
    let mut events = handle.subscribe_events();

    let event = events.recv().await.expect("initial fetch event");
    assert_eq!(event.change, CatalogChange::ProductsReplaced { count: 2 });
    assert_eq!(event.snapshot.filtered.len(), 2);
}

#[tokio::test]
async fn unreachable_endpoint_surfaces_error_text() {
    let settings = CatalogSettings {
        endpoint_url: unreachable_endpoint(),
        fetch_on_start: false,
        ..CatalogSettings::default()
    };
    let handle = ProductCatalogStore::spawn_http(&settings);

    let error = match handle.refresh().await.expect("refresh") {
        FetchOutcome::Failed { error } => error,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(error.starts_with("Failed to fetch products: "));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(snapshot.products.is_empty());
    assert_eq!(snapshot.last_error, Some(error));
}
