use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::database::{
    MediaRepository, PaginatedEntryRepository, RecommendedEntryRepository, RecommendedScope,
};
use crate::domain::{EntryWithMedia, Media, MediaType, RecommendedEntry};
use crate::paging::PageFetcher;
use crate::remote::RecommendedDataSource;
use crate::shared::errors::AppResult;
use crate::store::{Fetcher, SourceOfTruth, Store, StoreState};

type RecommendedPage = Vec<EntryWithMedia<RecommendedEntry>>;

/// Store for "recommended for X": the subject's TMDB id and media kind
/// are fixed per instance, keyed by page number.
#[derive(Clone)]
pub struct RecommendedStore {
    store: Store<i32, RecommendedPage>,
}

impl RecommendedStore {
    pub fn new(
        data_source: Arc<dyn RecommendedDataSource>,
        media_repository: Arc<MediaRepository>,
        entry_repository: Arc<RecommendedEntryRepository>,
        media_type: MediaType,
        recommendation_of: i32,
        scope: CancellationToken,
    ) -> Self {
        let listing = RecommendedScope {
            media_type,
            rec_of: recommendation_of,
        };
        let fetcher = Arc::new(RecommendedFetcher {
            data_source,
            media_repository,
            listing,
        });
        let source = Arc::new(RecommendedSourceOfTruth {
            entry_repository,
            listing,
        });
        Self {
            store: Store::new(fetcher, source, scope),
        }
    }

    pub async fn get(&self, page: i32, cancel: &CancellationToken) -> AppResult<RecommendedPage> {
        self.store.get(&page, cancel).await
    }

    pub async fn refresh(
        &self,
        page: i32,
        cancel: &CancellationToken,
    ) -> AppResult<RecommendedPage> {
        self.store.refresh(&page, cancel).await
    }

    pub async fn observe(&self, page: i32) -> watch::Receiver<Option<RecommendedPage>> {
        self.store.observe(&page).await
    }

    pub fn state_of(&self, page: i32) -> StoreState {
        self.store.state_of(&page)
    }

    pub fn invalidate(&self, page: i32) {
        self.store.invalidate(&page)
    }

    pub fn invalidate_all(&self) {
        self.store.invalidate_all()
    }

    pub async fn delete(&self, page: i32) -> AppResult<()> {
        self.store.delete(&page).await
    }

    pub async fn delete_all(&self) -> AppResult<()> {
        self.store.delete_all().await
    }

    /// Adapter for the pagination mediator.
    pub fn page_fetcher(&self, cancel: CancellationToken) -> Arc<dyn PageFetcher> {
        Arc::new(RecommendedPageFetcher {
            store: self.clone(),
            cancel,
        })
    }
}

struct RecommendedPageFetcher {
    store: RecommendedStore,
    cancel: CancellationToken,
}

#[async_trait]
impl PageFetcher for RecommendedPageFetcher {
    async fn fetch_page(&self, page: i32) -> AppResult<()> {
        self.store.refresh(page, &self.cancel).await.map(|_| ())
    }
}

struct RecommendedFetcher {
    data_source: Arc<dyn RecommendedDataSource>,
    media_repository: Arc<MediaRepository>,
    listing: RecommendedScope,
}

#[async_trait]
impl Fetcher<i32, RecommendedPage> for RecommendedFetcher {
    async fn fetch(&self, page: &i32) -> AppResult<RecommendedPage> {
        let fetched = self
            .data_source
            .recommended(self.listing.rec_of, self.listing.media_type, *page)
            .await?;

        let mut entries = Vec::with_capacity(fetched.len());
        for media in fetched {
            let media_id = self.media_repository.get_id_or_save_media(&media).await?;
            let entry = RecommendedEntry {
                id: 0,
                media_id,
                page: *page,
                media_type: media.media_type.unwrap_or(self.listing.media_type),
                recommendation_of: self.listing.rec_of,
            };
            entries.push(EntryWithMedia {
                entry,
                media: Media { id: media_id, ..media },
            });
        }
        Ok(entries)
    }
}

struct RecommendedSourceOfTruth {
    entry_repository: Arc<RecommendedEntryRepository>,
    listing: RecommendedScope,
}

#[async_trait]
impl SourceOfTruth<i32, RecommendedPage> for RecommendedSourceOfTruth {
    async fn read(&self, page: &i32) -> AppResult<Option<RecommendedPage>> {
        self.entry_repository
            .entries_for_page(&self.listing, *page)
            .await
            .map(Some)
    }

    async fn write(&self, page: &i32, value: RecommendedPage) -> AppResult<()> {
        if *page == 1 {
            self.entry_repository.delete_scope(&self.listing).await?;
        }
        let entries = value.into_iter().map(|item| item.entry).collect();
        self.entry_repository
            .update_page(&self.listing, *page, entries)
            .await
    }

    async fn delete(&self, page: &i32) -> AppResult<()> {
        self.entry_repository.delete_page(&self.listing, *page).await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.entry_repository.delete_scope(&self.listing).await
    }
}
