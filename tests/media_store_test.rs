//! Media store tests: single-media refresh merges remote values into the
//! saved row without losing the watched flag.

mod utils;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tokio_util::sync::CancellationToken;
use watchdone::database::MediaRepository;
use watchdone::domain::{Media, MediaType};
use watchdone::remote::MediaDetailDataSource;
use watchdone::shared::errors::{AppError, AppResult};
use watchdone::store::{MediaStore, MediaStoreRequest};

use utils::{sample_movie, test_db};

mock! {
    pub Source {}

    #[async_trait]
    impl MediaDetailDataSource for Source {
        async fn media(&self, tmdb_id: i32, media_type: MediaType) -> AppResult<Media>;
    }
}

#[tokio::test]
async fn refresh_merges_remote_into_saved_row() {
    let media_repository = Arc::new(MediaRepository::new(test_db()));
    let id = media_repository
        .get_id_or_save_media(&sample_movie(27205, "Inceptoin"))
        .await
        .unwrap();
    media_repository.set_watched(id, true).await.unwrap();

    let mut source = MockSource::new();
    source.expect_media().times(1).returning(|tmdb_id, _| {
        assert_eq!(tmdb_id, 27205);
        Ok(Media {
            rating: Some(8.8),
            ..sample_movie(27205, "Inception")
        })
    });

    let store = MediaStore::new(
        Arc::new(source),
        Arc::clone(&media_repository),
        CancellationToken::new(),
    );

    let request = MediaStoreRequest {
        id,
        media_type: MediaType::Movie,
    };
    let refreshed = store.get(request, &CancellationToken::new()).await.unwrap();

    // Remote wins on fresh fields, the watched flag survives.
    assert_eq!(refreshed.title.as_deref(), Some("Inception"));
    assert_eq!(refreshed.rating, Some(8.8));
    assert!(refreshed.is_watched);
    assert_eq!(refreshed.id, id);
}

#[tokio::test]
async fn unknown_local_id_is_a_descriptive_not_found() {
    let media_repository = Arc::new(MediaRepository::new(test_db()));

    let mut source = MockSource::new();
    source.expect_media().times(0);

    let store = MediaStore::new(
        Arc::new(source),
        media_repository,
        CancellationToken::new(),
    );

    let request = MediaStoreRequest {
        id: 42,
        media_type: MediaType::Movie,
    };
    let err = store
        .get(request, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AppError::NotFound(message) => assert!(message.contains("42")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}
