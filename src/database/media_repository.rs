use std::sync::Arc;

use diesel::prelude::*;

use crate::database::connection::Database;
use crate::database::models::{MediaChangeset, MediaRow, NewMediaRow};
use crate::domain::Media;
use crate::schema::media;
use crate::shared::errors::{AppError, AppResult};

diesel::define_sql_function! {
    fn last_insert_rowid() -> BigInt;
}

/// Repository for canonical media rows. Also hosts the identity
/// resolver: repeated fetches of the same external id collapse onto one
/// local row.
pub struct MediaRepository {
    db: Arc<Database>,
}

impl MediaRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Media>> {
        self.db
            .read(move |conn| {
                let row = media::table
                    .filter(media::id.eq(id))
                    .first::<MediaRow>(conn)
                    .optional()?;
                Ok(row.map(MediaRow::into_media))
            })
            .await
    }

    /// Lookup that treats absence as a caller error, with a message that
    /// names the missing id.
    pub async fn media_or_fail(&self, id: i64) -> AppResult<Media> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("No media with id {} in database", id))
        })
    }

    pub async fn find_by_tmdb_id(&self, tmdb_id: i32) -> AppResult<Option<Media>> {
        self.db
            .read(move |conn| {
                let row = media::table
                    .filter(media::tmdb_id.eq(tmdb_id))
                    .first::<MediaRow>(conn)
                    .optional()?;
                Ok(row.map(MediaRow::into_media))
            })
            .await
    }

    pub async fn id_for_tmdb_id(&self, tmdb_id: i32) -> AppResult<Option<i64>> {
        self.db
            .read(move |conn| {
                let id = media::table
                    .filter(media::tmdb_id.eq(tmdb_id))
                    .select(media::id)
                    .first::<i64>(conn)
                    .optional()?;
                Ok(id)
            })
            .await
    }

    pub async fn media_by_ids(&self, ids: Vec<i64>) -> AppResult<Vec<Media>> {
        self.db
            .read(move |conn| {
                let rows = media::table
                    .filter(media::id.eq_any(&ids))
                    .load::<MediaRow>(conn)?;
                Ok(rows.into_iter().map(MediaRow::into_media).collect())
            })
            .await
    }

    /// Find the canonical local id for a fetched media item, inserting it
    /// on first sight. Dedup is by external id only; items without one are
    /// always inserted fresh.
    pub async fn get_id_or_save_media(&self, item: &Media) -> AppResult<i64> {
        let item = item.clone();
        self.db
            .write(move |conn| {
                conn.transaction(|conn| {
                    if let Some(tmdb_id) = item.tmdb_id {
                        let existing = media::table
                            .filter(media::tmdb_id.eq(tmdb_id))
                            .select(media::id)
                            .first::<i64>(conn)
                            .optional()?;
                        if let Some(id) = existing {
                            return Ok(id);
                        }
                    }

                    diesel::insert_into(media::table)
                        .values(NewMediaRow::from(&item))
                        .execute(conn)?;
                    diesel::select(last_insert_rowid())
                        .get_result::<i64>(conn)
                        .map_err(AppError::from)
                })
            })
            .await
    }

    /// Insert or update in place, keyed on the local id when saved,
    /// else on the external id. Returns the row's local id.
    pub async fn upsert(&self, item: &Media) -> AppResult<i64> {
        let item = item.clone();
        self.db
            .write(move |conn| {
                conn.transaction(|conn| {
                    let target_id = if item.is_saved() {
                        Some(item.id)
                    } else if let Some(tmdb_id) = item.tmdb_id {
                        media::table
                            .filter(media::tmdb_id.eq(tmdb_id))
                            .select(media::id)
                            .first::<i64>(conn)
                            .optional()?
                    } else {
                        None
                    };

                    match target_id {
                        Some(id) => {
                            diesel::update(media::table.filter(media::id.eq(id)))
                                .set(MediaChangeset::from(&item))
                                .execute(conn)?;
                            Ok(id)
                        }
                        None => {
                            diesel::insert_into(media::table)
                                .values(NewMediaRow::from(&item))
                                .execute(conn)?;
                            diesel::select(last_insert_rowid())
                                .get_result::<i64>(conn)
                                .map_err(AppError::from)
                        }
                    }
                })
            })
            .await
    }

    pub async fn set_watched(&self, id: i64, watched: bool) -> AppResult<()> {
        self.db
            .write(move |conn| {
                let updated = diesel::update(media::table.filter(media::id.eq(id)))
                    .set(media::is_watched.eq(watched))
                    .execute(conn)?;
                if updated == 0 {
                    return Err(AppError::NotFound(format!(
                        "No media with id {} in database",
                        id
                    )));
                }
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.db
            .write(move |conn| {
                diesel::delete(media::table.filter(media::id.eq(id))).execute(conn)?;
                Ok(())
            })
            .await
    }

    pub async fn delete_all(&self) -> AppResult<()> {
        self.db
            .write(|conn| {
                diesel::delete(media::table).execute(conn)?;
                Ok(())
            })
            .await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.db
            .read(|conn| {
                media::table
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(AppError::from)
            })
            .await
    }
}
