use crate::domain::{Media, MediaType};
use crate::remote::models::{TmdbMovie, TmdbShow};

/// Translates TMDB wire models into the internal media shape. The remote
/// has no notion of "watched", so everything arrives unwatched; the merge
/// step reconciles that with the saved row.
#[derive(Debug, Clone, Copy, Default)]
pub struct TmdbMapper;

impl TmdbMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn movie_to_media(&self, movie: TmdbMovie) -> Media {
        Media {
            id: Media::UNSAVED_ID,
            tmdb_id: Some(movie.id),
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            title: movie.title,
            is_watched: false,
            poster_path: movie.poster_path,
            media_type: Some(MediaType::Movie),
            rating: movie.vote_average,
        }
    }

    pub fn show_to_media(&self, show: TmdbShow) -> Media {
        Media {
            id: Media::UNSAVED_ID,
            tmdb_id: Some(show.id),
            release_date: show.first_air_date.filter(|d| !d.is_empty()),
            title: show.name,
            is_watched: false,
            poster_path: show.poster_path,
            media_type: Some(MediaType::Show),
            rating: show.vote_average,
        }
    }
}
