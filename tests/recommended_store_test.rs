//! Recommended-store flow, including the mediator adapter driving
//! page fetches.

mod utils;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tokio_util::sync::CancellationToken;
use watchdone::database::MediaRepository;
use watchdone::database::RecommendedEntryRepository;
use watchdone::domain::{EntryWithMedia, Media, MediaType, RecommendedEntry};
use watchdone::paging::{LoadType, MediatorResult, PagingState, PaginatedEntryMediator};
use watchdone::remote::RecommendedDataSource;
use watchdone::shared::errors::AppResult;
use watchdone::store::RecommendedStore;

use utils::{sample_show, test_db};

mock! {
    pub Source {}

    #[async_trait]
    impl RecommendedDataSource for Source {
        async fn recommended(
            &self,
            tmdb_id: i32,
            media_type: MediaType,
            page: i32,
        ) -> AppResult<Vec<Media>>;
    }
}

fn recommended_store(source: MockSource) -> RecommendedStore {
    let db = test_db();
    RecommendedStore::new(
        Arc::new(source),
        Arc::new(MediaRepository::new(Arc::clone(&db))),
        Arc::new(RecommendedEntryRepository::new(db)),
        MediaType::Show,
        1399,
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn entries_record_their_recommendation_subject() {
    let mut source = MockSource::new();
    source
        .expect_recommended()
        .times(1)
        .returning(|tmdb_id, _, page| {
            assert_eq!(tmdb_id, 1399);
            assert_eq!(page, 1);
            Ok(vec![sample_show(60574, "Peaky Blinders")])
        });

    let store = recommended_store(source);
    let page = store.get(1, &CancellationToken::new()).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].entry.recommendation_of, 1399);
    assert_eq!(page[0].entry.media_type, MediaType::Show);
}

#[tokio::test]
async fn mediator_append_drives_the_next_page_fetch() {
    let mut source = MockSource::new();
    let mut seq = mockall::Sequence::new();
    source
        .expect_recommended()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, page| {
            assert_eq!(page, 1);
            Ok(vec![sample_show(100, "First")])
        });
    source
        .expect_recommended()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, page| {
            assert_eq!(page, 2);
            Ok(vec![sample_show(200, "Second")])
        });

    let store = recommended_store(source);
    let cancel = CancellationToken::new();
    let mediator: PaginatedEntryMediator<EntryWithMedia<RecommendedEntry>> =
        PaginatedEntryMediator::new(store.page_fetcher(cancel.clone()));

    // Refresh loads page 1.
    let result = mediator
        .load(LoadType::Refresh, &PagingState::empty())
        .await;
    assert_eq!(
        result,
        MediatorResult::Success {
            end_of_pagination_reached: false
        }
    );

    // Append continues after the last loaded entry's page.
    let loaded = store.get(1, &cancel).await.unwrap();
    let state = PagingState {
        pages: vec![loaded],
    };
    let result = mediator.load(LoadType::Append, &state).await;
    assert_eq!(
        result,
        MediatorResult::Success {
            end_of_pagination_reached: false
        }
    );

    let page_two = store.get(2, &cancel).await.unwrap();
    assert_eq!(page_two[0].media.title.as_deref(), Some("Second"));
}
