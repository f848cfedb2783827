//! Bridges a paged-list UI abstraction to store fetches.
//!
//! The mediator decides which page to request from three load events.
//! REFRESH reloads from the first page. APPEND continues after the last
//! loaded item's recorded page. PREPEND is never supported: backward
//! pagination always reports end-of-pagination immediately.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{EntryWithMedia, PaginatedEntry};
use crate::shared::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    Refresh,
    Prepend,
    Append,
}

/// Outcome of one mediator load. `Error` is recoverable: the paged UI is
/// expected to expose it as a retry affordance.
#[derive(Debug, Clone, PartialEq)]
pub enum MediatorResult {
    Success { end_of_pagination_reached: bool },
    Error(AppError),
}

/// Anything a paged list can hold that knows which page it came from.
pub trait PagedItem {
    fn page(&self) -> i32;
}

impl<E: PaginatedEntry> PagedItem for EntryWithMedia<E> {
    fn page(&self) -> i32 {
        self.entry.page()
    }
}

/// Snapshot of what the paged UI currently holds.
#[derive(Debug, Clone, Default)]
pub struct PagingState<I> {
    pub pages: Vec<Vec<I>>,
}

impl<I> PagingState<I> {
    pub fn empty() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn last_item(&self) -> Option<&I> {
        self.pages.iter().rev().flat_map(|page| page.iter().rev()).next()
    }
}

/// Triggers the store fetch for a page; the store's reader is what the
/// UI actually consumes afterwards.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: i32) -> AppResult<()>;
}

const FIRST_PAGE: i32 = 1;
/// Older result-page sources count pages from zero.
const LEGACY_FIRST_PAGE: i32 = 0;

pub struct PaginatedEntryMediator<I> {
    fetch: Arc<dyn PageFetcher>,
    first_page: i32,
    _item: PhantomData<fn() -> I>,
}

impl<I: PagedItem> PaginatedEntryMediator<I> {
    pub fn new(fetch: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetch,
            first_page: FIRST_PAGE,
            _item: PhantomData,
        }
    }

    pub fn legacy(fetch: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetch,
            first_page: LEGACY_FIRST_PAGE,
            _item: PhantomData,
        }
    }

    pub async fn load(&self, load_type: LoadType, state: &PagingState<I>) -> MediatorResult {
        let next_page = match load_type {
            LoadType::Refresh => self.first_page,
            LoadType::Prepend => {
                return MediatorResult::Success {
                    end_of_pagination_reached: true,
                }
            }
            LoadType::Append => match state.last_item() {
                Some(item) => item.page() + 1,
                None => {
                    return MediatorResult::Success {
                        end_of_pagination_reached: true,
                    }
                }
            },
        };

        match self.fetch.fetch_page(next_page).await {
            Ok(()) => MediatorResult::Success {
                end_of_pagination_reached: false,
            },
            Err(err) => MediatorResult::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{DiscoverCategory, DiscoverEntry, Media, MediaType};

    struct RecordingFetcher {
        calls: AtomicUsize,
        last_page: std::sync::Mutex<Option<i32>>,
        fail: bool,
    }

    impl RecordingFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_page: std::sync::Mutex::new(None),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_page: std::sync::Mutex::new(None),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn fetch_page(&self, page: i32) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_page.lock().unwrap() = Some(page);
            if self.fail {
                Err(AppError::ApiError("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn item(page: i32) -> EntryWithMedia<DiscoverEntry> {
        EntryWithMedia {
            entry: DiscoverEntry {
                id: 1,
                media_id: 1,
                page,
                media_type: MediaType::Movie,
                category: DiscoverCategory::Popular,
            },
            media: Media::default(),
        }
    }

    #[tokio::test]
    async fn refresh_requests_first_page() {
        let fetcher = RecordingFetcher::new();
        let mediator = PaginatedEntryMediator::<EntryWithMedia<DiscoverEntry>>::new(fetcher.clone());

        let result = mediator
            .load(LoadType::Refresh, &PagingState::empty())
            .await;

        assert_eq!(
            result,
            MediatorResult::Success {
                end_of_pagination_reached: false
            }
        );
        assert_eq!(*fetcher.last_page.lock().unwrap(), Some(1));
    }

    #[tokio::test]
    async fn legacy_refresh_requests_page_zero() {
        let fetcher = RecordingFetcher::new();
        let mediator = PaginatedEntryMediator::<EntryWithMedia<DiscoverEntry>>::legacy(
            fetcher.clone(),
        );

        mediator.load(LoadType::Refresh, &PagingState::empty()).await;

        assert_eq!(*fetcher.last_page.lock().unwrap(), Some(0));
    }

    #[tokio::test]
    async fn prepend_is_always_terminal_without_fetching() {
        let fetcher = RecordingFetcher::new();
        let mediator = PaginatedEntryMediator::new(fetcher.clone());
        let state = PagingState {
            pages: vec![vec![item(1)], vec![item(2)]],
        };

        let result = mediator.load(LoadType::Prepend, &state).await;

        assert_eq!(
            result,
            MediatorResult::Success {
                end_of_pagination_reached: true
            }
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn append_with_empty_state_is_terminal_without_fetching() {
        let fetcher = RecordingFetcher::new();
        let mediator = PaginatedEntryMediator::<EntryWithMedia<DiscoverEntry>>::new(fetcher.clone());

        let result = mediator
            .load(LoadType::Append, &PagingState::<EntryWithMedia<DiscoverEntry>>::empty())
            .await;

        assert_eq!(
            result,
            MediatorResult::Success {
                end_of_pagination_reached: true
            }
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn append_requests_page_after_last_item() {
        let fetcher = RecordingFetcher::new();
        let mediator = PaginatedEntryMediator::new(fetcher.clone());
        let state = PagingState {
            pages: vec![vec![item(1)], vec![item(2), item(2)]],
        };

        let result = mediator.load(LoadType::Append, &state).await;

        assert_eq!(
            result,
            MediatorResult::Success {
                end_of_pagination_reached: false
            }
        );
        assert_eq!(*fetcher.last_page.lock().unwrap(), Some(3));
    }

    #[tokio::test]
    async fn fetch_failure_becomes_recoverable_error() {
        let fetcher = RecordingFetcher::failing();
        let mediator = PaginatedEntryMediator::new(fetcher.clone());
        let state = PagingState {
            pages: vec![vec![item(1)]],
        };

        let result = mediator.load(LoadType::Append, &state).await;

        assert!(matches!(result, MediatorResult::Error(_)));
    }
}
