pub mod connection;
pub mod entry_repository;
pub mod media_repository;
pub mod models;

pub use connection::{Database, DbConnection, DbPool};
pub use entry_repository::{
    DiscoverEntryRepository, DiscoverScope, PaginatedEntryRepository, RecommendedEntryRepository,
    RecommendedScope,
};
pub use media_repository::MediaRepository;
