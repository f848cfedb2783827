use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::errors::AppError;

/// Kind of media a canonical record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Show,
    Season,
    Episode,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "show" => Ok(MediaType::Show),
            "season" => Ok(MediaType::Season),
            "episode" => Ok(MediaType::Episode),
            other => Err(AppError::InvalidInput(format!(
                "Unknown media type: {}",
                other
            ))),
        }
    }
}

/// Canonical local record for one external movie or show entity.
///
/// `id` is the local surrogate key (0 until saved); `tmdb_id` is the
/// external identity, unique across the media table when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub tmdb_id: Option<i32>,
    pub release_date: Option<String>,
    pub title: Option<String>,
    pub is_watched: bool,
    pub poster_path: Option<String>,
    pub media_type: Option<MediaType>,
    pub rating: Option<f64>,
}

impl Media {
    pub const UNSAVED_ID: i64 = 0;

    pub fn is_saved(&self) -> bool {
        self.id != Self::UNSAVED_ID
    }
}

/// Field-by-field reconciliation of a freshly fetched record with the
/// previously saved one. The remote's values are fresher for everything
/// except the watched flag: the external API has no notion of "watched"
/// and always reports `false`, so the locally recorded flag survives.
pub fn merge_media(local: &Media, remote: &Media) -> Media {
    Media {
        id: local.id,
        tmdb_id: remote.tmdb_id.or(local.tmdb_id),
        release_date: remote
            .release_date
            .clone()
            .or_else(|| local.release_date.clone()),
        title: remote.title.clone().or_else(|| local.title.clone()),
        is_watched: local.is_watched || remote.is_watched,
        poster_path: remote
            .poster_path
            .clone()
            .or_else(|| local.poster_path.clone()),
        media_type: remote.media_type.or(local.media_type),
        rating: remote.rating.or(local.rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: i64) -> Media {
        Media {
            id,
            tmdb_id: Some(550),
            release_date: Some("1999-10-15".to_string()),
            title: Some("Fight Club".to_string()),
            is_watched: true,
            poster_path: Some("/old.jpg".to_string()),
            media_type: Some(MediaType::Movie),
            rating: Some(8.4),
        }
    }

    #[test]
    fn merge_preserves_watched_flag() {
        let local = saved(7);
        let remote = Media {
            id: Media::UNSAVED_ID,
            tmdb_id: Some(550),
            release_date: Some("1999-10-15".to_string()),
            title: Some("Fight Club".to_string()),
            is_watched: false,
            poster_path: Some("/new.jpg".to_string()),
            media_type: Some(MediaType::Movie),
            rating: Some(8.5),
        };

        let merged = merge_media(&local, &remote);

        assert!(merged.is_watched);
        assert_eq!(merged.id, 7);
        assert_eq!(merged.poster_path.as_deref(), Some("/new.jpg"));
        assert_eq!(merged.rating, Some(8.5));
    }

    #[test]
    fn merge_keeps_local_values_where_remote_is_missing() {
        let local = saved(3);
        let remote = Media {
            tmdb_id: Some(550),
            rating: Some(8.6),
            ..Media::default()
        };

        let merged = merge_media(&local, &remote);

        assert_eq!(merged.title.as_deref(), Some("Fight Club"));
        assert_eq!(merged.release_date.as_deref(), Some("1999-10-15"));
        assert_eq!(merged.rating, Some(8.6));
    }

    #[test]
    fn media_type_round_trips_through_str() {
        for media_type in [
            MediaType::Movie,
            MediaType::Show,
            MediaType::Season,
            MediaType::Episode,
        ] {
            assert_eq!(media_type.as_str().parse::<MediaType>().unwrap(), media_type);
        }
        assert!("anime".parse::<MediaType>().is_err());
    }
}
