//! Width-limited execution lanes for local database access.
//!
//! All database writes funnel through a width-1 lane so the
//! delete-then-insert page replacement never interleaves with another
//! writer; reads get a width-4 lane to bound concurrent readers against
//! the embedded database.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::shared::errors::{AppError, AppResult};

const DEFAULT_WRITE_WIDTH: usize = 1;
const DEFAULT_READ_WIDTH: usize = 4;

#[derive(Clone, Debug)]
pub struct Dispatchers {
    db_write: Arc<Semaphore>,
    db_read: Arc<Semaphore>,
}

impl Dispatchers {
    pub fn new(write_width: usize, read_width: usize) -> Self {
        Self {
            db_write: Arc::new(Semaphore::new(write_width.max(1))),
            db_read: Arc::new(Semaphore::new(read_width.max(1))),
        }
    }

    /// Acquire a slot on the serialized write lane.
    pub async fn acquire_db_write(&self) -> AppResult<OwnedSemaphorePermit> {
        Arc::clone(&self.db_write)
            .acquire_owned()
            .await
            .map_err(|_| AppError::InternalError("Write dispatcher closed".to_string()))
    }

    /// Acquire a slot on the bounded read lane.
    pub async fn acquire_db_read(&self) -> AppResult<OwnedSemaphorePermit> {
        Arc::clone(&self.db_read)
            .acquire_owned()
            .await
            .map_err(|_| AppError::InternalError("Read dispatcher closed".to_string()))
    }
}

impl Default for Dispatchers {
    fn default() -> Self {
        Self::new(DEFAULT_WRITE_WIDTH, DEFAULT_READ_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_lane_is_serialized() {
        let dispatchers = Dispatchers::default();

        let first = dispatchers.acquire_db_write().await.unwrap();
        // Second writer must wait until the first permit is released.
        assert!(dispatchers.db_write.available_permits() == 0);
        drop(first);
        let _second = dispatchers.acquire_db_write().await.unwrap();
    }

    #[tokio::test]
    async fn read_lane_allows_bounded_parallelism() {
        let dispatchers = Dispatchers::default();

        let _a = dispatchers.acquire_db_read().await.unwrap();
        let _b = dispatchers.acquire_db_read().await.unwrap();
        let _c = dispatchers.acquire_db_read().await.unwrap();
        let _d = dispatchers.acquire_db_read().await.unwrap();
        assert_eq!(dispatchers.db_read.available_permits(), 0);
    }
}
