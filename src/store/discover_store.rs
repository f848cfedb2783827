use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::database::{DiscoverEntryRepository, DiscoverScope, MediaRepository, PaginatedEntryRepository};
use crate::domain::{DiscoverCategory, DiscoverEntry, EntryWithMedia, Media, MediaType};
use crate::paging::PageFetcher;
use crate::remote::DiscoverDataSource;
use crate::shared::errors::AppResult;
use crate::store::{Fetcher, SourceOfTruth, Store, StoreState};

type DiscoverPage = Vec<EntryWithMedia<DiscoverEntry>>;

/// Store for one discover listing: media kind + category fixed per
/// instance, keyed by page number.
#[derive(Clone)]
pub struct DiscoverStore {
    store: Store<i32, DiscoverPage>,
}

impl DiscoverStore {
    pub fn new(
        data_source: Arc<dyn DiscoverDataSource>,
        media_repository: Arc<MediaRepository>,
        entry_repository: Arc<DiscoverEntryRepository>,
        media_type: MediaType,
        category: DiscoverCategory,
        scope: CancellationToken,
    ) -> Self {
        let listing = DiscoverScope {
            media_type,
            category,
        };
        let fetcher = Arc::new(DiscoverFetcher {
            data_source,
            media_repository,
            listing,
        });
        let source = Arc::new(DiscoverSourceOfTruth {
            entry_repository,
            listing,
        });
        Self {
            store: Store::new(fetcher, source, scope),
        }
    }

    pub async fn get(&self, page: i32, cancel: &CancellationToken) -> AppResult<DiscoverPage> {
        self.store.get(&page, cancel).await
    }

    pub async fn refresh(&self, page: i32, cancel: &CancellationToken) -> AppResult<DiscoverPage> {
        self.store.refresh(&page, cancel).await
    }

    pub async fn observe(&self, page: i32) -> watch::Receiver<Option<DiscoverPage>> {
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

    /// Adapter for the pagination mediator: every requested page becomes
    /// a forced fetch of that page.
    pub fn page_fetcher(&self, cancel: CancellationToken) -> Arc<dyn PageFetcher> {
        Arc::new(DiscoverPageFetcher {
            store: self.clone(),
            cancel,
        })
    }
}

struct DiscoverPageFetcher {
    store: DiscoverStore,
    cancel: CancellationToken,
}

#[async_trait]
impl PageFetcher for DiscoverPageFetcher {
    async fn fetch_page(&self, page: i32) -> AppResult<()> {
        self.store.refresh(page, &self.cancel).await.map(|_| ())
    }
}

struct DiscoverFetcher {
    data_source: Arc<dyn DiscoverDataSource>,
    media_repository: Arc<MediaRepository>,
    listing: DiscoverScope,
}

#[async_trait]
impl Fetcher<i32, DiscoverPage> for DiscoverFetcher {
    async fn fetch(&self, page: &i32) -> AppResult<DiscoverPage> {
        let fetched = self
            .data_source
            .discover(*page, self.listing.media_type, self.listing.category)
            .await?;

        let mut entries = Vec::with_capacity(fetched.len());
        for media in fetched {
            let media_id = self.media_repository.get_id_or_save_media(&media).await?;
            let entry = DiscoverEntry {
                id: 0,
                media_id,
                page: *page,
                media_type: media.media_type.unwrap_or(self.listing.media_type),
                category: self.listing.category,
            };
            entries.push(EntryWithMedia {
                entry,
                media: Media { id: media_id, ..media },
            });
        }
        Ok(entries)
    }
}

struct DiscoverSourceOfTruth {
    entry_repository: Arc<DiscoverEntryRepository>,
    listing: DiscoverScope,
}

#[async_trait]
impl SourceOfTruth<i32, DiscoverPage> for DiscoverSourceOfTruth {
    async fn read(&self, page: &i32) -> AppResult<Option<DiscoverPage>> {
        self.entry_repository
            .entries_for_page(&self.listing, *page)
            .await
            .map(Some)
    }

    async fn write(&self, page: &i32, value: DiscoverPage) -> AppResult<()> {
        // Page 1 is a fresh full reload: clear this listing before writing
        // so stale deeper pages don't linger under the new first page.
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
