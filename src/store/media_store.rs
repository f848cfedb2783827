use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::database::MediaRepository;
use crate::domain::{merge_media, Media, MediaType};
use crate::remote::MediaDetailDataSource;
use crate::shared::errors::{AppError, AppResult};
use crate::store::{Fetcher, SourceOfTruth, Store, StoreState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaStoreRequest {
    pub id: i64,
    pub media_type: MediaType,
}

/// Store for refreshing a single saved media row from the remote API.
/// The row must already exist locally (it carries the external id); the
/// write path merges the fetched values into it, keeping the watched
/// flag.
#[derive(Clone)]
pub struct MediaStore {
    store: Store<MediaStoreRequest, Media>,
}

impl MediaStore {
    pub fn new(
        data_source: Arc<dyn MediaDetailDataSource>,
        media_repository: Arc<MediaRepository>,
        scope: CancellationToken,
    ) -> Self {
        let fetcher = Arc::new(MediaFetcher {
            data_source,
            media_repository: Arc::clone(&media_repository),
        });
        let source = Arc::new(MediaSourceOfTruth { media_repository });
        Self {
            store: Store::new(fetcher, source, scope),
        }
    }

    pub async fn get(
        &self,
        request: MediaStoreRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Media> {
        self.store.get(&request, cancel).await
    }

    pub async fn refresh(
        &self,
        request: MediaStoreRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Media> {
        self.store.refresh(&request, cancel).await
    }

    pub async fn observe(&self, request: MediaStoreRequest) -> watch::Receiver<Option<Media>> {
        self.store.observe(&request).await
    }

    pub fn state_of(&self, request: MediaStoreRequest) -> StoreState {
        self.store.state_of(&request)
    }

    pub fn invalidate(&self, request: MediaStoreRequest) {
        self.store.invalidate(&request)
    }

    pub fn invalidate_all(&self) {
        self.store.invalidate_all()
    }

    pub async fn delete(&self, request: MediaStoreRequest) -> AppResult<()> {
        self.store.delete(&request).await
    }

    pub async fn delete_all(&self) -> AppResult<()> {
        self.store.delete_all().await
    }
}

struct MediaFetcher {
    data_source: Arc<dyn MediaDetailDataSource>,
    media_repository: Arc<MediaRepository>,
}

#[async_trait]
impl Fetcher<MediaStoreRequest, Media> for MediaFetcher {
    async fn fetch(&self, request: &MediaStoreRequest) -> AppResult<Media> {
        let saved = self.media_repository.media_or_fail(request.id).await?;
        let tmdb_id = saved.tmdb_id.ok_or_else(|| {
            AppError::NotFound(format!(
                "Media {} has no external id to refresh from",
                request.id
            ))
        })?;

        match request.media_type {
            MediaType::Movie | MediaType::Show => {
                self.data_source.media(tmdb_id, request.media_type).await
            }
            other => Err(AppError::InvalidInput(format!(
                "Media store refreshes movies and shows, not {}",
                other
            ))),
        }
    }
}

struct MediaSourceOfTruth {
    media_repository: Arc<MediaRepository>,
}

#[async_trait]
impl SourceOfTruth<MediaStoreRequest, Media> for MediaSourceOfTruth {
    async fn read(&self, request: &MediaStoreRequest) -> AppResult<Option<Media>> {
        self.media_repository.find_by_id(request.id).await
    }

    async fn write(&self, request: &MediaStoreRequest, remote: Media) -> AppResult<()> {
        let local = self.media_repository.media_or_fail(request.id).await?;
        self.media_repository
            .upsert(&merge_media(&local, &remote))
            .await?;
        Ok(())
    }

    async fn delete(&self, request: &MediaStoreRequest) -> AppResult<()> {
        self.media_repository.delete(request.id).await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.media_repository.delete_all().await
    }
}
