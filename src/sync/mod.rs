//! Query synchronizer
//!
//! Bridges the [`FilterStateStore`] to an [`AssetQueryService`]. Every
//! committed filter change is normalized and issued as a new request; the
//! synchronizer never waits for the response.
//!
//! # Ordering
//!
//! ```text
//! set_preset ──▶ observer ──▶ normalize ──▶ ResultState::begin()  (sequence = n)
//!                                              │
//!                                              └──▶ spawn(service.query) ──▶ complete(n, result)
//!                                                                               │
//!                                        applied only if state.sequence == n ◀──┘
//! ```
//!
//! Requests are issued in commit order but may resolve in any order. The
//! latest issued sequence number lives inside the watched [`ResultState`],
//! and both "begin a request" and "apply a response" run under the watch
//! channel's lock, so a superseded response can never overwrite a newer one.
//! Superseded requests are not cancelled; they run to completion and their
//! results are discarded.

use crate::core::asset::{Address, AssetResult};
use crate::core::error::{Result, SyncError};
use crate::core::events::{EventBus, QueryEvent};
use crate::core::filter::{PresetFilter, QueryVariables};
use crate::core::normalize::{QueryContext, normalize};
use crate::core::presentation::{QueryStatus, ResultState, ResultView};
use crate::core::service::AssetQueryService;
use crate::core::store::{FilterStateStore, Subscription};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// State shared between the synchronizer, its store observer and its
/// in-flight requests
struct SyncShared {
    service: Arc<dyn AssetQueryService>,
    runtime: Handle,
    state: watch::Sender<ResultState>,
    events: Option<EventBus>,
}

impl SyncShared {
    fn publish(&self, event: QueryEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// Start a new request cycle without waiting for it
    fn issue(self: &Arc<Self>, variables: QueryVariables) -> u64 {
        let mut sequence = 0;
        self.state.send_modify(|state| sequence = state.begin());

        tracing::debug!(
            sequence,
            attributes = variables.attributes.len(),
            owners = variables.owners.is_some(),
            listed = variables.listed.is_some(),
            "Asset query issued"
        );
        self.publish(QueryEvent::Issued { sequence });

        if variables.matches_nothing() {
            tracing::debug!(sequence, "Query cannot match any asset, resolving locally");
            self.complete(sequence, Ok(Vec::new()));
            return sequence;
        }

        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = shared.service.query(&variables).await;
            shared.complete(sequence, result);
        });

        sequence
    }

    /// Apply a response if it belongs to the latest issued request
    fn complete(&self, sequence: u64, result: Result<Vec<AssetResult>>) {
        let mut latest = sequence;
        let mut event = None;

        self.state.send_if_modified(|state| {
            latest = state.sequence;
            if state.sequence != sequence {
                return false;
            }
            match result {
                Ok(items) => {
                    event = Some(QueryEvent::Applied {
                        sequence,
                        items: items.len(),
                    });
                    state.status = QueryStatus::Success;
                    state.items = items;
                }
                Err(err) => {
                    let message = err.to_string();
                    event = Some(QueryEvent::Failed {
                        sequence,
                        message: message.clone(),
                    });
                    state.status = QueryStatus::Error { message };
                    state.items.clear();
                }
            }
            true
        });

        match event {
            Some(QueryEvent::Failed { sequence, message }) => {
                tracing::warn!(sequence, error = %message, "Asset query failed");
                self.publish(QueryEvent::Failed { sequence, message });
            }
            Some(event) => {
                tracing::debug!(sequence, "Asset query applied");
                self.publish(event);
            }
            None => {
                tracing::debug!(sequence, latest, "Discarding superseded asset query response");
                self.publish(QueryEvent::Discarded { sequence, latest });
            }
        }
    }
}

/// Configures and mounts a [`QuerySynchronizer`]
pub struct SynchronizerBuilder {
    service: Arc<dyn AssetQueryService>,
    context: QueryContext,
    events: Option<EventBus>,
    runtime: Option<Handle>,
}

impl SynchronizerBuilder {
    /// Publish lifecycle events on this bus
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Spawn requests on this runtime instead of the current one
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Subscribe to the store and issue the initial query
    pub fn mount(self, store: &FilterStateStore) -> Result<QuerySynchronizer> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| SyncError::NoRuntime(e.to_string()))?,
        };

        let (state, _) = watch::channel(ResultState::idle());
        let shared = Arc::new(SyncShared {
            service: self.service,
            runtime,
            state,
            events: self.events,
        });

        let mut synchronizer = QuerySynchronizer {
            shared,
            store: store.clone(),
            context: self.context,
            subscription: None,
        };
        synchronizer.refetch();
        synchronizer.resubscribe();

        tracing::info!(
            creators = synchronizer.context.creators.len(),
            wallet = synchronizer.context.wallet.is_some(),
            "Query synchronizer mounted"
        );

        Ok(synchronizer)
    }
}

/// Keeps one view's asset results in sync with its filter store
///
/// Dropping the synchronizer (or calling [`QuerySynchronizer::unmount`])
/// releases the store subscription. Requests already in flight still
/// complete.
pub struct QuerySynchronizer {
    shared: Arc<SyncShared>,
    store: FilterStateStore,
    context: QueryContext,
    subscription: Option<Subscription>,
}

impl QuerySynchronizer {
    pub fn builder(
        service: Arc<dyn AssetQueryService>,
        context: QueryContext,
    ) -> SynchronizerBuilder {
        SynchronizerBuilder {
            service,
            context,
            events: None,
            runtime: None,
        }
    }

    /// Mount on the current tokio runtime without an event bus
    pub fn mount(
        store: &FilterStateStore,
        service: Arc<dyn AssetQueryService>,
        context: QueryContext,
    ) -> Result<Self> {
        Self::builder(service, context).mount(store)
    }

    /// Replace the store observer with one bound to the current context
    fn resubscribe(&mut self) {
        // Release the old observer before registering the new one so a change
        // is never handled twice
        self.subscription = None;

        let shared = Arc::clone(&self.shared);
        let context = self.context.clone();
        self.subscription = Some(self.store.subscribe(move |form| {
            shared.issue(normalize(form, &context));
        }));
    }

    /// Issue a request for the store's current state
    pub fn refetch(&self) -> u64 {
        let variables = normalize(&self.store.snapshot(), &self.context);
        self.shared.issue(variables)
    }

    /// Follow a wallet connection change
    ///
    /// The observer is re-registered with the new wallet. A request is issued
    /// only when the `Owned` preset is active, since no other preset depends
    /// on the wallet. After [`QuerySynchronizer::unmount`] the context is
    /// updated but nothing is issued.
    pub fn set_wallet(&mut self, wallet: Option<Address>) {
        if self.context.wallet == wallet {
            return;
        }

        self.context.wallet = wallet;
        if !self.is_mounted() {
            return;
        }

        tracing::debug!(connected = self.context.wallet.is_some(), "Wallet changed, resubscribing");
        self.resubscribe();
        if self.store.preset() == PresetFilter::Owned {
            self.refetch();
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop reacting to filter changes
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            tracing::info!("Query synchronizer unmounted");
        }
    }

    /// Copy of the current presentation state
    pub fn state(&self) -> ResultState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every presentation state change
    pub fn watch(&self) -> watch::Receiver<ResultState> {
        self.shared.state.subscribe()
    }

    /// Render the current state for this view's marketplace
    pub fn view(&self, placeholders: usize) -> ResultView {
        ResultView::render(
            &self.shared.state.borrow(),
            placeholders,
            self.context.auction_house.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::FacetOption;
    use crate::core::error::{QueryError, StorefrontError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every query and answers with a fixed outcome
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<QueryVariables>>,
        fail: bool,
    }

    #[async_trait]
    impl AssetQueryService for RecordingService {
        async fn query(&self, variables: &QueryVariables) -> Result<Vec<AssetResult>> {
            self.calls.lock().unwrap().push(variables.clone());
            if self.fail {
                return Err(StorefrontError::Query(QueryError::Transport(
                    "connection refused".to_string(),
                )));
            }
            Ok(vec![AssetResult {
                address: "N1".into(),
                name: "Skull #1".to_string(),
                description: String::new(),
                image: String::new(),
                listings: vec![],
            }])
        }
    }

    fn context() -> QueryContext {
        QueryContext::new(vec!["C".into()], Some("AH1".into()))
    }

    async fn settled(sync: &QuerySynchronizer) -> ResultState {
        let mut rx = sync.watch();
        rx.wait_for(|state| !state.is_loading()).await.unwrap().clone()
    }

    #[test]
    fn test_mount_requires_runtime() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let err = QuerySynchronizer::mount(&store, service, context()).err().unwrap();
        assert_eq!(err.error_code(), "SYNC_ERROR");
    }

    #[tokio::test]
    async fn test_mount_issues_initial_query() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let sync = QuerySynchronizer::mount(&store, service.clone(), context()).unwrap();

        assert_eq!(sync.state().sequence, 1);
        let state = settled(&sync).await;
        assert!(state.is_success());
        assert_eq!(state.items.len(), 1);

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], QueryVariables::for_creators(vec!["C".into()]));
    }

    #[tokio::test]
    async fn test_each_change_issues_one_request() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let sync = QuerySynchronizer::mount(&store, service.clone(), context()).unwrap();

        store.set_preset(PresetFilter::Listed);
        store.set_preset(PresetFilter::Listed);
        store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (1)")]);

        assert_eq!(sync.state().sequence, 3);
        settled(&sync).await;
        tokio::task::yield_now().await;

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].listed, Some(vec!["AH1".into()]));
        assert_eq!(calls[2].attributes.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_clears_to_error_state() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService {
            fail: true,
            ..Default::default()
        });
        let sync = QuerySynchronizer::mount(&store, service, context()).unwrap();

        let state = settled(&sync).await;
        assert!(state.is_error());
        assert!(state.items.is_empty());
        assert!(matches!(sync.view(8), ResultView::Error { .. }));
    }

    #[tokio::test]
    async fn test_owned_without_wallet_resolves_empty_locally() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let sync = QuerySynchronizer::mount(&store, service.clone(), context()).unwrap();
        settled(&sync).await;

        store.set_preset(PresetFilter::Owned);

        let state = sync.state();
        assert!(state.is_success());
        assert!(state.items.is_empty());
        assert!(matches!(sync.view(8), ResultView::Empty { .. }));
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_wallet_refetches_only_for_owned() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let mut sync = QuerySynchronizer::mount(&store, service.clone(), context()).unwrap();

        sync.set_wallet(Some("W1".into()));
        assert_eq!(sync.state().sequence, 1);
        assert_eq!(store.observer_count(), 1);

        store.set_preset(PresetFilter::Owned);
        sync.set_wallet(Some("W2".into()));
        assert_eq!(sync.state().sequence, 3);

        settled(&sync).await;
        tokio::task::yield_now().await;
        let calls = service.calls.lock().unwrap();
        let owners: Vec<_> = calls.iter().filter_map(|c| c.owners.clone()).collect();
        assert!(owners.contains(&vec![Some("W1".into())]));
        assert!(owners.contains(&vec![Some("W2".into())]));
    }

    #[tokio::test]
    async fn test_unmount_releases_subscription() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let mut sync = QuerySynchronizer::mount(&store, service, context()).unwrap();
        assert!(sync.is_mounted());

        sync.unmount();
        assert!(!sync.is_mounted());
        assert_eq!(store.observer_count(), 0);

        store.set_preset(PresetFilter::Listed);
        assert_eq!(sync.state().sequence, 1);
    }

    #[tokio::test]
    async fn test_wallet_change_after_unmount_issues_nothing() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let mut sync = QuerySynchronizer::mount(&store, service.clone(), context()).unwrap();
        store.set_preset(PresetFilter::Owned);
        assert_eq!(sync.state().sequence, 2);

        sync.unmount();
        sync.set_wallet(Some("W".into()));

        assert_eq!(sync.state().sequence, 2);
        assert_eq!(sync.context().wallet, Some("W".into()));
        assert_eq!(store.observer_count(), 0);
        tokio::task::yield_now().await;
        let calls = service.calls.lock().unwrap();
        assert!(calls.iter().all(|vars| vars.owners.is_none()));
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let store = FilterStateStore::new();
        let service = Arc::new(RecordingService::default());
        let sync = QuerySynchronizer::mount(&store, service, context()).unwrap();
        drop(sync);
        assert_eq!(store.observer_count(), 0);
    }
}
