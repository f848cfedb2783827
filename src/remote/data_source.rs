use async_trait::async_trait;

use crate::config::TmdbConfig;
use crate::domain::{DiscoverCategory, Media, MediaType};
use crate::remote::http_client::RateLimitClient;
use crate::remote::mapper::TmdbMapper;
use crate::remote::models::{TmdbMovie, TmdbPage, TmdbShow};
use crate::search::SearchParams;
use crate::shared::errors::{AppError, AppResult};

#[async_trait]
pub trait DiscoverDataSource: Send + Sync {
    async fn discover(
        &self,
        page: i32,
        media_type: MediaType,
        category: DiscoverCategory,
    ) -> AppResult<Vec<Media>>;
}

#[async_trait]
pub trait SearchDataSource: Send + Sync {
    async fn search(&self, params: &SearchParams) -> AppResult<Vec<Media>>;
}

#[async_trait]
pub trait RecommendedDataSource: Send + Sync {
    async fn recommended(
        &self,
        tmdb_id: i32,
        media_type: MediaType,
        page: i32,
    ) -> AppResult<Vec<Media>>;
}

#[async_trait]
pub trait MediaDetailDataSource: Send + Sync {
    async fn media(&self, tmdb_id: i32, media_type: MediaType) -> AppResult<Media>;
}

/// How a discover category is served: a curated TMDB list endpoint, or
/// the generic /discover endpoint with filter parameters.
enum Listing {
    Curated(&'static str),
    Discover(Vec<(&'static str, String)>),
}

/// TMDB REST adapter. Stateless translation of API responses into the
/// internal media shape; HTTP errors propagate once the client's retry
/// budget is exhausted.
pub struct TmdbDataSource {
    http_client: RateLimitClient,
    config: TmdbConfig,
    mapper: TmdbMapper,
}

impl TmdbDataSource {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            http_client: RateLimitClient::for_tmdb(),
            config,
            mapper: TmdbMapper::new(),
        }
    }

    /// Create adapter with custom HTTP client (for testing)
    pub fn with_client(http_client: RateLimitClient, config: TmdbConfig) -> Self {
        Self {
            http_client,
            config,
            mapper: TmdbMapper::new(),
        }
    }

    pub fn can_make_request_now(&self) -> bool {
        self.http_client.can_make_request_now()
    }

    /// Build URL with API key, language and additional query parameters
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}&language={}",
            self.config.base_url, endpoint, self.config.api_key, self.config.language
        );
        for (key, value) in params {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }
        url
    }

    fn type_path(media_type: MediaType) -> AppResult<&'static str> {
        match media_type {
            MediaType::Movie => Ok("movie"),
            MediaType::Show => Ok("tv"),
            other => Err(AppError::InvalidInput(format!(
                "TMDB listings cover movies and shows, not {}",
                other
            ))),
        }
    }

    fn listing_for(
        &self,
        media_type: MediaType,
        category: DiscoverCategory,
    ) -> AppResult<Listing> {
        use DiscoverCategory::*;

        let listing = match (category, media_type) {
            (Uncategorized, _) => Listing::Discover(vec![]),
            (NowPlaying, MediaType::Movie) => Listing::Curated("now_playing"),
            (Upcoming, MediaType::Movie) => Listing::Curated("upcoming"),
            (Popular, _) => Listing::Curated("popular"),
            (TopRated, _) => Listing::Curated("top_rated"),
            (AiringToday, MediaType::Show) => Listing::Curated("airing_today"),
            (OnTv, MediaType::Show) => Listing::Curated("on_the_air"),
            // Release type 5 = physical
            (OnDvd, MediaType::Movie) => Listing::Discover(vec![
                ("with_release_type", "5".to_string()),
                ("region", self.config.watch_region().to_string()),
            ]),
            (OnNetflix, _) => self.watch_provider_listing("8"),
            (OnAmazon, _) => self.watch_provider_listing("9"),
            (OnDisneyPlus, _) => self.watch_provider_listing("337"),
            (OnAppleTv, _) => self.watch_provider_listing("350"),
            (category, media_type) => {
                return Err(AppError::InvalidInput(format!(
                    "Category {} is not available for {}",
                    category, media_type
                )))
            }
        };
        Ok(listing)
    }

    fn watch_provider_listing(&self, provider_id: &str) -> Listing {
        Listing::Discover(vec![
            ("with_watch_providers", provider_id.to_string()),
            ("watch_region", self.config.watch_region().to_string()),
        ])
    }

    async fn fetch_movie_page(&self, url: &str) -> AppResult<Vec<Media>> {
        let response: TmdbPage<TmdbMovie> = self.http_client.get(url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|movie| self.mapper.movie_to_media(movie))
            .collect())
    }

    async fn fetch_show_page(&self, url: &str) -> AppResult<Vec<Media>> {
        let response: TmdbPage<TmdbShow> = self.http_client.get(url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|show| self.mapper.show_to_media(show))
            .collect())
    }

    async fn fetch_page(&self, media_type: MediaType, url: &str) -> AppResult<Vec<Media>> {
        match media_type {
            MediaType::Movie => self.fetch_movie_page(url).await,
            _ => self.fetch_show_page(url).await,
        }
    }
}

#[async_trait]
impl DiscoverDataSource for TmdbDataSource {
    async fn discover(
        &self,
        page: i32,
        media_type: MediaType,
        category: DiscoverCategory,
    ) -> AppResult<Vec<Media>> {
        let type_path = Self::type_path(media_type)?;
        let page_param = ("page", page.to_string());

        let url = match self.listing_for(media_type, category)? {
            Listing::Curated(suffix) => self.build_url(
                &format!("/{}/{}", type_path, suffix),
                std::slice::from_ref(&page_param),
            ),
            Listing::Discover(extra) => {
                let mut params: Vec<(&str, String)> = vec![page_param];
                params.extend(extra);
                self.build_url(&format!("/discover/{}", type_path), &params)
            }
        };

        log::info!(
            "TMDB: Discover {} {} (page {})",
            media_type,
            category,
            page
        );

        let results = self.fetch_page(media_type, &url).await?;

        log::info!(
            "TMDB: Discover {} {} returned {} results",
            media_type,
            category,
            results.len()
        );
        Ok(results)
    }
}

#[async_trait]
impl SearchDataSource for TmdbDataSource {
    async fn search(&self, params: &SearchParams) -> AppResult<Vec<Media>> {
        let type_path = Self::type_path(params.media_type)?;
        let url = self.build_url(
            &format!("/search/{}", type_path),
            &[
                ("query", params.query.clone()),
                ("page", params.page.to_string()),
                ("include_adult", "false".to_string()),
            ],
        );

        log::info!(
            "TMDB: Searching {} for '{}' (page {})",
            type_path,
            params.query,
            params.page
        );

        self.fetch_page(params.media_type, &url).await
    }
}

#[async_trait]
impl RecommendedDataSource for TmdbDataSource {
    async fn recommended(
        &self,
        tmdb_id: i32,
        media_type: MediaType,
        page: i32,
    ) -> AppResult<Vec<Media>> {
        let type_path = Self::type_path(media_type)?;
        let url = self.build_url(
            &format!("/{}/{}/recommendations", type_path, tmdb_id),
            &[("page", page.to_string())],
        );

        log::info!(
            "TMDB: Recommendations for {} {} (page {})",
            type_path,
            tmdb_id,
            page
        );

        self.fetch_page(media_type, &url).await
    }
}

#[async_trait]
impl MediaDetailDataSource for TmdbDataSource {
    async fn media(&self, tmdb_id: i32, media_type: MediaType) -> AppResult<Media> {
        let type_path = Self::type_path(media_type)?;
        let url = self.build_url(&format!("/{}/{}", type_path, tmdb_id), &[]);

        log::info!("TMDB: Getting {} by id {}", type_path, tmdb_id);

        match media_type {
            MediaType::Movie => {
                let movie: TmdbMovie = self.http_client.get(&url).await?;
                Ok(self.mapper.movie_to_media(movie))
            }
            _ => {
                let show: TmdbShow = self.http_client.get(&url).await?;
                Ok(self.mapper.show_to_media(show))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> TmdbDataSource {
        TmdbDataSource::new(TmdbConfig::new("test-key").with_region("GB"))
    }

    #[test]
    fn build_url_encodes_parameters() {
        let url = source().build_url("/search/movie", &[("query", "the matrix".to_string())]);
        assert!(url.starts_with("https://api.themoviedb.org/3/search/movie?api_key=test-key"));
        assert!(url.contains("query=the%20matrix"));
        assert!(url.contains("language=en-US"));
    }

    #[test]
    fn curated_listings_reject_wrong_media_type() {
        let err = source()
            .listing_for(MediaType::Show, DiscoverCategory::NowPlaying)
            .err();
        assert!(matches!(err, Some(AppError::InvalidInput(_))));
    }

    #[test]
    fn streaming_categories_use_watch_region() {
        match source()
            .listing_for(MediaType::Movie, DiscoverCategory::OnNetflix)
            .unwrap()
        {
            Listing::Discover(params) => {
                assert!(params.contains(&("with_watch_providers", "8".to_string())));
                assert!(params.contains(&("watch_region", "GB".to_string())));
            }
            Listing::Curated(_) => panic!("expected a discover listing"),
        }
    }
}
