//! Search with a small in-process result cache.
//!
//! Results are resolved through the identity resolver and cached as
//! local row ids keyed by (page, query). A cache hit is a local-store
//! read only; it never re-hits the network, even if the local rows
//! changed in between.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::database::MediaRepository;
use crate::domain::{Media, MediaType};
use crate::remote::SearchDataSource;
use crate::shared::errors::AppResult;

const CACHE_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub page: i32,
    pub media_type: MediaType,
}

impl SearchParams {
    pub fn new(query: impl Into<String>, page: i32, media_type: MediaType) -> Self {
        Self {
            query: query.into(),
            page,
            media_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    page: i32,
    query: String,
}

pub struct SearchRepository {
    data_source: Arc<dyn SearchDataSource>,
    media_repository: Arc<MediaRepository>,
    cache: Mutex<LruCache<CacheKey, Vec<i64>>>,
}

impl SearchRepository {
    pub fn new(
        data_source: Arc<dyn SearchDataSource>,
        media_repository: Arc<MediaRepository>,
    ) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap();
        Self {
            data_source,
            media_repository,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Search the remote source, degrading failures to "no results".
    /// A blank query returns empty without touching the cache or the
    /// network.
    pub async fn search(&self, params: &SearchParams, cancel: &CancellationToken) -> Vec<Media> {
        if params.query.trim().is_empty() {
            return Vec::new();
        }
        if cancel.is_cancelled() {
            return Vec::new();
        }

        let key = CacheKey {
            page: params.page,
            query: params.query.clone(),
        };

        let cached_ids = {
            let mut cache = self.cache.lock().await;
            cache.get(&key).cloned()
        };

        if let Some(ids) = cached_ids {
            debug!(page = params.page, query = %params.query, "search cache hit");
            return self.resolve_ids(&ids).await.unwrap_or_default();
        }

        match self.search_remote(params, &key).await {
            Ok(results) => results,
            Err(err) => {
                // Degrade to "no results" but leave a distinguishable trace.
                warn!(query = %params.query, error = %err, "search failed, returning empty results");
                Vec::new()
            }
        }
    }

    async fn search_remote(&self, params: &SearchParams, key: &CacheKey) -> AppResult<Vec<Media>> {
        let fetched = self.data_source.search(params).await?;

        let mut ids = Vec::with_capacity(fetched.len());
        for media in fetched {
            ids.push(self.media_repository.get_id_or_save_media(&media).await?);
        }

        {
            let mut cache = self.cache.lock().await;
            cache.put(key.clone(), ids.clone());
        }

        self.resolve_ids(&ids).await
    }

    /// Map cached row ids back to media rows, preserving order and
    /// skipping ids whose rows have since been deleted.
    async fn resolve_ids(&self, ids: &[i64]) -> AppResult<Vec<Media>> {
        let lookups = ids
            .iter()
            .map(|id| self.media_repository.find_by_id(*id));
        let resolved = futures::future::try_join_all(lookups).await?;
        Ok(resolved.into_iter().flatten().collect())
    }
}
