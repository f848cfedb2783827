pub mod data_source;
pub mod http_client;
pub mod mapper;
pub mod models;

pub use data_source::{
    DiscoverDataSource, MediaDetailDataSource, RecommendedDataSource, SearchDataSource,
    TmdbDataSource,
};
pub use http_client::{RateLimitClient, RetryPolicy};
