pub mod entry;
pub mod media;

pub use entry::{
    DiscoverCategory, DiscoverEntry, EntryWithMedia, PaginatedEntry, RecommendedEntry,
};
pub use media::{merge_media, Media, MediaType};
