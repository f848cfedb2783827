use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::media::{Media, MediaType};
use crate::shared::errors::AppError;

/// Capability surface shared by every paginated listing row.
pub trait PaginatedEntry: Clone + Send + Sync {
    fn media_id(&self) -> i64;
    fn page(&self) -> i32;
    fn media_type(&self) -> MediaType;
}

/// Listing a media item can appear under on the discover surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverCategory {
    Uncategorized,
    NowPlaying,
    Upcoming,
    Popular,
    TopRated,
    AiringToday,
    OnDvd,
    OnTv,
    OnNetflix,
    OnAmazon,
    OnDisneyPlus,
    OnAppleTv,
}

impl DiscoverCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverCategory::Uncategorized => "uncategorized",
            DiscoverCategory::NowPlaying => "now_playing",
            DiscoverCategory::Upcoming => "upcoming",
            DiscoverCategory::Popular => "popular",
            DiscoverCategory::TopRated => "top_rated",
            DiscoverCategory::AiringToday => "airing_today",
            DiscoverCategory::OnDvd => "on_dvd",
            DiscoverCategory::OnTv => "on_tv",
            DiscoverCategory::OnNetflix => "on_netflix",
            DiscoverCategory::OnAmazon => "on_amazon",
            DiscoverCategory::OnDisneyPlus => "on_disney_plus",
            DiscoverCategory::OnAppleTv => "on_apple_tv",
        }
    }
}

impl fmt::Display for DiscoverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoverCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uncategorized" => Ok(DiscoverCategory::Uncategorized),
            "now_playing" => Ok(DiscoverCategory::NowPlaying),
            "upcoming" => Ok(DiscoverCategory::Upcoming),
            "popular" => Ok(DiscoverCategory::Popular),
            "top_rated" => Ok(DiscoverCategory::TopRated),
            "airing_today" => Ok(DiscoverCategory::AiringToday),
            "on_dvd" => Ok(DiscoverCategory::OnDvd),
            "on_tv" => Ok(DiscoverCategory::OnTv),
            "on_netflix" => Ok(DiscoverCategory::OnNetflix),
            "on_amazon" => Ok(DiscoverCategory::OnAmazon),
            "on_disney_plus" => Ok(DiscoverCategory::OnDisneyPlus),
            "on_apple_tv" => Ok(DiscoverCategory::OnAppleTv),
            other => Err(AppError::InvalidInput(format!(
                "Unknown discover category: {}",
                other
            ))),
        }
    }
}

/// Membership of a media item in one page of a discover listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverEntry {
    pub id: i64,
    pub media_id: i64,
    pub page: i32,
    pub media_type: MediaType,
    pub category: DiscoverCategory,
}

impl PaginatedEntry for DiscoverEntry {
    fn media_id(&self) -> i64 {
        self.media_id
    }

    fn page(&self) -> i32 {
        self.page
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }
}

/// Membership of a media item in one page of "recommended for X".
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedEntry {
    pub id: i64,
    pub media_id: i64,
    pub page: i32,
    pub media_type: MediaType,
    /// TMDB id of the media the recommendations were requested for.
    pub recommendation_of: i32,
}

impl PaginatedEntry for RecommendedEntry {
    fn media_id(&self) -> i64 {
        self.media_id
    }

    fn page(&self) -> i32 {
        self.page
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }
}

/// An entry row joined with its canonical media record.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryWithMedia<E: PaginatedEntry> {
    pub entry: E,
    pub media: Media,
}
