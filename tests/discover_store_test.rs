//! End-to-end discover flow: fetch → identity resolution → transactional
//! page replacement → local read-back.

mod utils;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tokio_util::sync::CancellationToken;
use watchdone::database::{DiscoverEntryRepository, MediaRepository};
use watchdone::domain::{DiscoverCategory, Media, MediaType};
use watchdone::remote::DiscoverDataSource;
use watchdone::shared::errors::{AppError, AppResult};
use watchdone::store::DiscoverStore;

use utils::{sample_movie, test_db};

mock! {
    pub Source {}

    #[async_trait]
    impl DiscoverDataSource for Source {
        async fn discover(
            &self,
            page: i32,
            media_type: MediaType,
            category: DiscoverCategory,
        ) -> AppResult<Vec<Media>>;
    }
}

fn discover_store(source: MockSource) -> (DiscoverStore, Arc<MediaRepository>) {
    let db = test_db();
    let media_repository = Arc::new(MediaRepository::new(Arc::clone(&db)));
    let store = DiscoverStore::new(
        Arc::new(source),
        Arc::clone(&media_repository),
        Arc::new(DiscoverEntryRepository::new(db)),
        MediaType::Movie,
        DiscoverCategory::Popular,
        CancellationToken::new(),
    );
    (store, media_repository)
}

#[tokio::test]
async fn page_fetch_resolves_identities_and_reads_back_joined_rows() {
    let mut source = MockSource::new();
    source.expect_discover().times(1).returning(|page, _, _| {
        assert_eq!(page, 1);
        Ok(vec![
            sample_movie(27205, "Inception"),
            sample_movie(550, "Fight Club"),
        ])
    });

    let (store, media_repository) = discover_store(source);
    let cancel = CancellationToken::new();

    let page = store.get(1, &cancel).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].media.title.as_deref(), Some("Inception"));
    assert!(page[0].entry.id > 0);
    assert_eq!(page[0].entry.page, 1);
    assert_eq!(page[0].entry.category, DiscoverCategory::Popular);
    // Entries reference canonical media rows.
    assert_eq!(
        media_repository.id_for_tmdb_id(27205).await.unwrap(),
        Some(page[0].entry.media_id)
    );
}

#[tokio::test]
async fn second_get_serves_local_rows_without_refetching() {
    let mut source = MockSource::new();
    source
        .expect_discover()
        .times(1)
        .returning(|_, _, _| Ok(vec![sample_movie(603, "The Matrix")]));

    let (store, _) = discover_store(source);
    let cancel = CancellationToken::new();

    let first = store.get(1, &cancel).await.unwrap();
    let second = store.get(1, &cancel).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn refetched_media_keeps_watched_flag_through_identity_resolution() {
    let mut source = MockSource::new();
    source
        .expect_discover()
        .times(2)
        .returning(|_, _, _| Ok(vec![sample_movie(603, "The Matrix")]));

    let (store, media_repository) = discover_store(source);
    let cancel = CancellationToken::new();

    let page = store.get(1, &cancel).await.unwrap();
    let media_id = page[0].entry.media_id;
    media_repository.set_watched(media_id, true).await.unwrap();

    let refreshed = store.refresh(1, &cancel).await.unwrap();

    assert_eq!(refreshed[0].entry.media_id, media_id);
    assert!(refreshed[0].media.is_watched);
}

#[tokio::test]
async fn page_one_refresh_clears_deeper_pages_of_the_listing() {
    let mut source = MockSource::new();
    let mut seq = mockall::Sequence::new();
    source
        .expect_discover()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(vec![sample_movie(1, "Page one")]));
    source
        .expect_discover()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(vec![sample_movie(2, "Page two")]));
    source
        .expect_discover()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(vec![sample_movie(3, "Fresh page one")]));

    let (store, _) = discover_store(source);
    let cancel = CancellationToken::new();

    store.get(1, &cancel).await.unwrap();
    store.get(2, &cancel).await.unwrap();

    let fresh = store.refresh(1, &cancel).await.unwrap();
    assert_eq!(fresh[0].media.title.as_deref(), Some("Fresh page one"));

    // Page 2 rows were cleared by the page-1 reload; the store reports
    // the page as empty until it is fetched again.
    store.invalidate(2);
    let mut rx = store.observe(2).await;
    let page_two = rx.borrow_and_update().clone().unwrap();
    assert!(page_two.is_empty());
}

#[tokio::test]
async fn fetch_error_leaves_previous_page_observable() {
    let mut source = MockSource::new();
    let mut seq = mockall::Sequence::new();
    source
        .expect_discover()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(vec![sample_movie(1, "Cached")]));
    source
        .expect_discover()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Err(AppError::ApiError("boom".to_string())));

    let (store, _) = discover_store(source);
    let cancel = CancellationToken::new();

    store.get(1, &cancel).await.unwrap();
    let err = store.refresh(1, &cancel).await.unwrap_err();
    assert!(matches!(err, AppError::ApiError(_)));

    let mut rx = store.observe(1).await;
    let current = rx.borrow_and_update().clone().unwrap();
    assert_eq!(current[0].media.title.as_deref(), Some("Cached"));
}
