//! Cache-then-fetch coordination over the local database.
//!
//! Each store pairs a [`Fetcher`] (remote call + identity resolution)
//! with a [`SourceOfTruth`] (local reads/writes). Callers only ever see
//! local-store state: a fetch is a side effect that updates the local
//! rows, which are then re-read and emitted. Per key the store runs a
//! small state machine (Idle, Fetching, Ready, Failed) with at most one
//! in-flight fetch; identical requests await the in-flight one instead of
//! issuing a duplicate.

mod discover_store;
mod media_store;
mod recommended_store;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::shared::errors::{AppError, AppResult};

pub use discover_store::DiscoverStore;
pub use media_store::{MediaStore, MediaStoreRequest};
pub use recommended_store::RecommendedStore;

/// Fetches the remote value for a key. Runs at most once per key at a
/// time; errors surface to the awaiters of that flight.
#[async_trait]
pub trait Fetcher<K, V>: Send + Sync {
    async fn fetch(&self, key: &K) -> AppResult<V>;
}

/// Local persistence for a store. `read` returning `None` means "nothing
/// known locally"; an empty collection is a legitimate `Some`.
#[async_trait]
pub trait SourceOfTruth<K, V>: Send + Sync {
    async fn read(&self, key: &K) -> AppResult<Option<V>>;
    async fn write(&self, key: &K, value: V) -> AppResult<()>;
    async fn delete(&self, key: &K) -> AppResult<()>;
    async fn delete_all(&self) -> AppResult<()>;
}

/// Per-key lifecycle. `Failed` is not sticky: the next request for the
/// key starts a fresh flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Idle,
    Fetching,
    Ready,
    Failed,
}

struct StoreInner<K, V> {
    fetcher: Arc<dyn Fetcher<K, V>>,
    source: Arc<dyn SourceOfTruth<K, V>>,
    states: DashMap<K, StoreState>,
    inflight: Mutex<HashMap<K, broadcast::Sender<Result<(), AppError>>>>,
    watchers: DashMap<K, watch::Sender<Option<V>>>,
    scope: CancellationToken,
}

/// Generic cache/source-of-truth coordinator.
///
/// Cloning is cheap and shares all state. The `scope` token bounds every
/// flight the store launches: cancelling it aborts in-flight fetches,
/// while a per-call token only abandons that caller's await.
pub struct Store<K, V> {
    inner: Arc<StoreInner<K, V>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        fetcher: Arc<dyn Fetcher<K, V>>,
        source: Arc<dyn SourceOfTruth<K, V>>,
        scope: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                fetcher,
                source,
                states: DashMap::new(),
                inflight: Mutex::new(HashMap::new()),
                watchers: DashMap::new(),
                scope,
            }),
        }
    }

    pub fn state_of(&self, key: &K) -> StoreState {
        self.inner
            .states
            .get(key)
            .map(|s| *s)
            .unwrap_or(StoreState::Idle)
    }

    /// Read the value for a key, fetching it first unless a previous
    /// fetch already satisfied this key.
    pub async fn get(&self, key: &K, cancel: &CancellationToken) -> AppResult<V> {
        if cancel.is_cancelled() || self.inner.scope.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        if self.state_of(key) == StoreState::Ready {
            if let Some(value) = self.inner.source.read(key).await? {
                debug!(key = ?key, "store hit, serving local rows");
                return Ok(value);
            }
            // Rows vanished underneath us (external delete); refetch.
        }

        self.fetch_and_read(key, cancel).await
    }

    /// Force a fetch for the key even if it is already Ready.
    pub async fn refresh(&self, key: &K, cancel: &CancellationToken) -> AppResult<V> {
        if cancel.is_cancelled() || self.inner.scope.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        self.fetch_and_read(key, cancel).await
    }

    /// Observe the local value for a key. The receiver holds the current
    /// local state and re-emits after every store write for the key.
    pub async fn observe(&self, key: &K) -> watch::Receiver<Option<V>> {
        let tx = self
            .inner
            .watchers
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None).0)
            .value()
            .clone();
        let current = self.inner.source.read(key).await.ok().flatten();
        tx.send_replace(current);
        tx.subscribe()
    }

    /// Drop the cached state for a key; the next `get` will fetch.
    pub fn invalidate(&self, key: &K) {
        self.inner.states.remove(key);
    }

    pub fn invalidate_all(&self) {
        self.inner.states.clear();
    }

    /// Delete the local rows for a key and reset its state.
    pub async fn delete(&self, key: &K) -> AppResult<()> {
        self.inner.source.delete(key).await?;
        self.inner.states.remove(key);
        Self::publish(&self.inner, key).await;
        Ok(())
    }

    /// Bulk-delete every row this store owns.
    pub async fn delete_all(&self) -> AppResult<()> {
        self.inner.source.delete_all().await?;
        self.inner.states.clear();
        let keys: Vec<K> = self
            .inner
            .watchers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for key in keys {
            Self::publish(&self.inner, &key).await;
        }
        Ok(())
    }

    /// Join (or start) the single flight for this key, then serve the
    /// re-read local rows.
    async fn fetch_and_read(&self, key: &K, cancel: &CancellationToken) -> AppResult<V> {
        let mut rx = {
            let mut inflight = self.inner.inflight.lock().await;
            match inflight.get(key) {
                Some(tx) => {
                    debug!(key = ?key, "joining in-flight fetch");
                    tx.subscribe()
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    inflight.insert(key.clone(), tx.clone());
                    self.inner.states.insert(key.clone(), StoreState::Fetching);
                    Self::spawn_flight(Arc::clone(&self.inner), key.clone(), tx);
                    rx
                }
            }
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            outcome = rx.recv() => outcome,
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(AppError::InternalError("Fetch flight dropped".to_string())),
        }

        match self.inner.source.read(key).await? {
            Some(value) => Ok(value),
            None => Err(AppError::NotFound(format!(
                "No local rows for key {:?} after fetch",
                key
            ))),
        }
    }

    fn spawn_flight(
        inner: Arc<StoreInner<K, V>>,
        key: K,
        tx: broadcast::Sender<Result<(), AppError>>,
    ) {
        tokio::spawn(async move {
            let scope = inner.scope.clone();
            let result = tokio::select! {
                _ = scope.cancelled() => Err(AppError::Cancelled),
                result = Self::run_fetch(&inner, &key) => result,
            };

            match &result {
                Ok(()) => {
                    inner.states.insert(key.clone(), StoreState::Ready);
                    Self::publish(&inner, &key).await;
                }
                Err(err) => {
                    inner.states.insert(key.clone(), StoreState::Failed);
                    debug!(key = ?key, error = %err, "fetch failed, keeping prior local rows");
                }
            }

            let mut inflight = inner.inflight.lock().await;
            inflight.remove(&key);
            // Broadcast after removal so late subscribers always find
            // either the channel or a settled state.
            let _ = tx.send(result);
        });
    }

    async fn run_fetch(inner: &StoreInner<K, V>, key: &K) -> AppResult<()> {
        let value = inner.fetcher.fetch(key).await?;
        inner.source.write(key, value).await
    }

    async fn publish(inner: &StoreInner<K, V>, key: &K) {
        let tx = match inner.watchers.get(key) {
            Some(entry) => entry.value().clone(),
            None => return,
        };
        let current = inner.source.read(key).await.ok().flatten();
        tx.send_replace(current);
    }
}
