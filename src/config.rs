use std::env;

use crate::shared::errors::{AppError, AppResult};

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Request parameters for the TMDB data source: credentials plus the
/// user's language/region settings, which feed discover and release
/// filtering.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub region: Option<String>,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TMDB_BASE_URL.to_string(),
            language: "en-US".to_string(),
            region: None,
        }
    }

    /// Reads `TMDB_API_KEY` (required), `TMDB_BASE_URL`,
    /// `WATCHDONE_LANGUAGE` and `WATCHDONE_REGION`.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("TMDB_API_KEY")
            .map_err(|_| AppError::InvalidInput("TMDB_API_KEY is not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("TMDB_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(language) = env::var("WATCHDONE_LANGUAGE") {
            config.language = language;
        }
        if let Ok(region) = env::var("WATCHDONE_REGION") {
            config.region = Some(region);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region used for watch-provider and release filters when the user
    /// has not picked one.
    pub fn watch_region(&self) -> &str {
        self.region.as_deref().unwrap_or("US")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TmdbConfig::new("key");
        assert_eq!(config.base_url, TMDB_BASE_URL);
        assert_eq!(config.language, "en-US");
        assert_eq!(config.watch_region(), "US");
    }

    #[test]
    fn builders_override_defaults() {
        let config = TmdbConfig::new("key")
            .with_language("de-DE")
            .with_region("DE")
            .with_base_url("http://localhost:8080/3");
        assert_eq!(config.language, "de-DE");
        assert_eq!(config.watch_region(), "DE");
        assert_eq!(config.base_url, "http://localhost:8080/3");
    }
}
