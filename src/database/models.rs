use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{DiscoverEntry, Media, RecommendedEntry};
use crate::schema::{discover_entries, media, recommended_entries};
use crate::shared::errors::AppResult;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = media)]
pub struct MediaRow {
    pub id: i64,
    pub tmdb_id: Option<i32>,
    pub release_date: Option<String>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    pub rating: Option<f64>,
    pub is_watched: bool,
    pub fetched_at: Option<NaiveDateTime>,
}

impl MediaRow {
    pub fn into_media(self) -> Media {
        Media {
            id: self.id,
            tmdb_id: self.tmdb_id,
            release_date: self.release_date,
            title: self.title,
            is_watched: self.is_watched,
            poster_path: self.poster_path,
            media_type: self.media_type.and_then(|t| t.parse().ok()),
            rating: self.rating,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = media)]
pub struct NewMediaRow {
    pub tmdb_id: Option<i32>,
    pub release_date: Option<String>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    pub rating: Option<f64>,
    pub is_watched: bool,
    pub fetched_at: Option<NaiveDateTime>,
}

impl From<&Media> for NewMediaRow {
    fn from(entity: &Media) -> Self {
        Self {
            tmdb_id: entity.tmdb_id,
            release_date: entity.release_date.clone(),
            title: entity.title.clone(),
            poster_path: entity.poster_path.clone(),
            media_type: entity.media_type.map(|t| t.as_str().to_string()),
            rating: entity.rating,
            is_watched: entity.is_watched,
            fetched_at: Some(chrono::Utc::now().naive_utc()),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = media)]
pub struct MediaChangeset {
    pub tmdb_id: Option<i32>,
    pub release_date: Option<String>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    pub rating: Option<f64>,
    pub is_watched: bool,
    pub fetched_at: Option<NaiveDateTime>,
}

impl From<&Media> for MediaChangeset {
    fn from(entity: &Media) -> Self {
        Self {
            tmdb_id: entity.tmdb_id,
            release_date: entity.release_date.clone(),
            title: entity.title.clone(),
            poster_path: entity.poster_path.clone(),
            media_type: entity.media_type.map(|t| t.as_str().to_string()),
            rating: entity.rating,
            is_watched: entity.is_watched,
            fetched_at: Some(chrono::Utc::now().naive_utc()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = discover_entries)]
pub struct DiscoverEntryRow {
    pub id: i64,
    pub media_id: i64,
    pub page: i32,
    pub media_type: String,
    pub category: String,
}

impl DiscoverEntryRow {
    pub fn into_entry(self) -> AppResult<DiscoverEntry> {
        Ok(DiscoverEntry {
            id: self.id,
            media_id: self.media_id,
            page: self.page,
            media_type: self.media_type.parse()?,
            category: self.category.parse()?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = discover_entries)]
pub struct NewDiscoverEntryRow {
    pub media_id: i64,
    pub page: i32,
    pub media_type: String,
    pub category: String,
}

impl From<&DiscoverEntry> for NewDiscoverEntryRow {
    fn from(entry: &DiscoverEntry) -> Self {
        Self {
            media_id: entry.media_id,
            page: entry.page,
            media_type: entry.media_type.as_str().to_string(),
            category: entry.category.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = recommended_entries)]
pub struct RecommendedEntryRow {
    pub id: i64,
    pub media_id: i64,
    pub page: i32,
    pub media_type: String,
    pub rec_of: i32,
}

impl RecommendedEntryRow {
    pub fn into_entry(self) -> AppResult<RecommendedEntry> {
        Ok(RecommendedEntry {
            id: self.id,
            media_id: self.media_id,
            page: self.page,
            media_type: self.media_type.parse()?,
            recommendation_of: self.rec_of,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recommended_entries)]
pub struct NewRecommendedEntryRow {
    pub media_id: i64,
    pub page: i32,
    pub media_type: String,
    pub rec_of: i32,
}

impl From<&RecommendedEntry> for NewRecommendedEntryRow {
    fn from(entry: &RecommendedEntry) -> Self {
        Self {
            media_id: entry.media_id,
            page: entry.page,
            media_type: entry.media_type.as_str().to_string(),
            rec_of: entry.recommendation_of,
        }
    }
}
