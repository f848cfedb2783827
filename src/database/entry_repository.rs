use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::database::connection::Database;
use crate::database::models::{
    DiscoverEntryRow, MediaRow, NewDiscoverEntryRow, NewRecommendedEntryRow, RecommendedEntryRow,
};
use crate::domain::{
    DiscoverCategory, DiscoverEntry, EntryWithMedia, MediaType, PaginatedEntry, RecommendedEntry,
};
use crate::schema::{discover_entries, media, recommended_entries};
use crate::shared::errors::AppResult;

/// Capability interface over a paginated entry table: read-by-key,
/// write-page, delete-page. A scope pins the listing (media kind plus
/// category or recommendation subject); a page within a scope is the
/// replacement unit.
#[async_trait]
pub trait PaginatedEntryRepository: Send + Sync {
    type Entry: PaginatedEntry + 'static;
    type Scope: Clone + Send + Sync + fmt::Debug + 'static;

    async fn entries_for_page(
        &self,
        scope: &Self::Scope,
        page: i32,
    ) -> AppResult<Vec<EntryWithMedia<Self::Entry>>>;

    /// Replace one page of a scope: delete every prior row for the
    /// (scope, page) key, then insert the fresh set. Runs in one
    /// transaction so a reader never observes the page half-replaced.
    async fn update_page(
        &self,
        scope: &Self::Scope,
        page: i32,
        entries: Vec<Self::Entry>,
    ) -> AppResult<()>;

    async fn delete_page(&self, scope: &Self::Scope, page: i32) -> AppResult<()>;

    async fn delete_scope(&self, scope: &Self::Scope) -> AppResult<()>;

    async fn delete_all(&self) -> AppResult<()>;

    async fn last_page(&self, scope: &Self::Scope) -> AppResult<Option<i32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoverScope {
    pub media_type: MediaType,
    pub category: DiscoverCategory,
}

pub struct DiscoverEntryRepository {
    db: Arc<Database>,
}

impl DiscoverEntryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaginatedEntryRepository for DiscoverEntryRepository {
    type Entry = DiscoverEntry;
    type Scope = DiscoverScope;

    async fn entries_for_page(
        &self,
        scope: &DiscoverScope,
        page: i32,
    ) -> AppResult<Vec<EntryWithMedia<DiscoverEntry>>> {
        let scope = *scope;
        self.db
            .read(move |conn| {
                let rows = discover_entries::table
                    .inner_join(media::table)
                    .filter(discover_entries::page.eq(page))
                    .filter(discover_entries::media_type.eq(scope.media_type.as_str()))
                    .filter(discover_entries::category.eq(scope.category.as_str()))
                    .order(discover_entries::id.asc())
                    .load::<(DiscoverEntryRow, MediaRow)>(conn)?;

                let mut items = Vec::with_capacity(rows.len());
                for (entry, media) in rows {
                    items.push(EntryWithMedia {
                        entry: entry.into_entry()?,
                        media: media.into_media(),
                    });
                }
                Ok(items)
            })
            .await
    }

    async fn update_page(
        &self,
        scope: &DiscoverScope,
        page: i32,
        entries: Vec<DiscoverEntry>,
    ) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                conn.transaction(|conn| {
                    diesel::delete(
                        discover_entries::table
                            .filter(discover_entries::page.eq(page))
                            .filter(discover_entries::media_type.eq(scope.media_type.as_str()))
                            .filter(discover_entries::category.eq(scope.category.as_str())),
                    )
                    .execute(conn)?;

                    let rows: Vec<NewDiscoverEntryRow> =
                        entries.iter().map(NewDiscoverEntryRow::from).collect();
                    diesel::replace_into(discover_entries::table)
                        .values(&rows)
                        .execute(conn)?;
                    Ok(())
                })
            })
            .await
    }

    async fn delete_page(&self, scope: &DiscoverScope, page: i32) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                diesel::delete(
                    discover_entries::table
                        .filter(discover_entries::page.eq(page))
                        .filter(discover_entries::media_type.eq(scope.media_type.as_str()))
                        .filter(discover_entries::category.eq(scope.category.as_str())),
                )
                .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn delete_scope(&self, scope: &DiscoverScope) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                diesel::delete(
                    discover_entries::table
                        .filter(discover_entries::media_type.eq(scope.media_type.as_str()))
                        .filter(discover_entries::category.eq(scope.category.as_str())),
                )
                .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.db
            .write(|conn| {
                diesel::delete(discover_entries::table).execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn last_page(&self, scope: &DiscoverScope) -> AppResult<Option<i32>> {
        let scope = *scope;
        self.db
            .read(move |conn| {
                let page = discover_entries::table
                    .filter(discover_entries::media_type.eq(scope.media_type.as_str()))
                    .filter(discover_entries::category.eq(scope.category.as_str()))
                    .select(diesel::dsl::max(discover_entries::page))
                    .first::<Option<i32>>(conn)?;
                Ok(page)
            })
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecommendedScope {
    pub media_type: MediaType,
    /// TMDB id the recommendations were requested for.
    pub rec_of: i32,
}

pub struct RecommendedEntryRepository {
    db: Arc<Database>,
}

impl RecommendedEntryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaginatedEntryRepository for RecommendedEntryRepository {
    type Entry = RecommendedEntry;
    type Scope = RecommendedScope;

    async fn entries_for_page(
        &self,
        scope: &RecommendedScope,
        page: i32,
    ) -> AppResult<Vec<EntryWithMedia<RecommendedEntry>>> {
        let scope = *scope;
        self.db
            .read(move |conn| {
                let rows = recommended_entries::table
                    .inner_join(media::table)
                    .filter(recommended_entries::page.eq(page))
                    .filter(recommended_entries::media_type.eq(scope.media_type.as_str()))
                    .filter(recommended_entries::rec_of.eq(scope.rec_of))
                    .order(recommended_entries::id.asc())
                    .load::<(RecommendedEntryRow, MediaRow)>(conn)?;

                let mut items = Vec::with_capacity(rows.len());
                for (entry, media) in rows {
                    items.push(EntryWithMedia {
                        entry: entry.into_entry()?,
                        media: media.into_media(),
                    });
                }
                Ok(items)
            })
            .await
    }

    async fn update_page(
        &self,
        scope: &RecommendedScope,
        page: i32,
        entries: Vec<RecommendedEntry>,
    ) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                conn.transaction(|conn| {
                    diesel::delete(
                        recommended_entries::table
                            .filter(recommended_entries::page.eq(page))
                            .filter(recommended_entries::media_type.eq(scope.media_type.as_str()))
                            .filter(recommended_entries::rec_of.eq(scope.rec_of)),
                    )
                    .execute(conn)?;

                    let rows: Vec<NewRecommendedEntryRow> =
                        entries.iter().map(NewRecommendedEntryRow::from).collect();
                    diesel::replace_into(recommended_entries::table)
                        .values(&rows)
                        .execute(conn)?;
                    Ok(())
                })
            })
            .await
    }

    async fn delete_page(&self, scope: &RecommendedScope, page: i32) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                diesel::delete(
                    recommended_entries::table
                        .filter(recommended_entries::page.eq(page))
                        .filter(recommended_entries::media_type.eq(scope.media_type.as_str()))
                        .filter(recommended_entries::rec_of.eq(scope.rec_of)),
                )
                .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn delete_scope(&self, scope: &RecommendedScope) -> AppResult<()> {
        let scope = *scope;
        self.db
            .write(move |conn| {
                diesel::delete(
                    recommended_entries::table
                        .filter(recommended_entries::media_type.eq(scope.media_type.as_str()))
                        .filter(recommended_entries::rec_of.eq(scope.rec_of)),
                )
                .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.db
            .write(|conn| {
                diesel::delete(recommended_entries::table).execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn last_page(&self, scope: &RecommendedScope) -> AppResult<Option<i32>> {
        let scope = *scope;
        self.db
            .read(move |conn| {
                let page = recommended_entries::table
                    .filter(recommended_entries::media_type.eq(scope.media_type.as_str()))
                    .filter(recommended_entries::rec_of.eq(scope.rec_of))
                    .select(diesel::dsl::max(recommended_entries::page))
                    .first::<Option<i32>>(conn)?;
                Ok(page)
            })
            .await
    }
}
