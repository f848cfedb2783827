//! Shared helpers for integration tests: an in-memory database and
//! sample media builders.

use std::sync::Arc;

use watchdone::database::Database;
use watchdone::domain::{Media, MediaType};

pub fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().expect("in-memory database"))
}

pub fn sample_movie(tmdb_id: i32, title: &str) -> Media {
    Media {
        id: Media::UNSAVED_ID,
        tmdb_id: Some(tmdb_id),
        release_date: Some("2010-07-16".to_string()),
        title: Some(title.to_string()),
        is_watched: false,
        poster_path: Some(format!("/{}.jpg", tmdb_id)),
        media_type: Some(MediaType::Movie),
        rating: Some(8.0),
    }
}

pub fn sample_show(tmdb_id: i32, title: &str) -> Media {
    Media {
        media_type: Some(MediaType::Show),
        ..sample_movie(tmdb_id, title)
    }
}
