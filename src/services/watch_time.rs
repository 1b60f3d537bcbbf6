//! Watch-time estimation from rating history.
//!
//! Every rated episode counts once at its show's per-episode runtime; the
//! rating value itself is irrelevant, rating is used as a proxy for "watched".

use crate::db::Store;
use crate::domain::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchTimeError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for WatchTimeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait WatchTimeService: Send + Sync {
    /// Total estimated minutes of television the user has watched.
    async fn watch_minutes(&self, user_id: UserId) -> Result<i64, WatchTimeError>;
}

pub struct SeaOrmWatchTimeService {
    store: Store,
}

impl SeaOrmWatchTimeService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl WatchTimeService for SeaOrmWatchTimeService {
    async fn watch_minutes(&self, user_id: UserId) -> Result<i64, WatchTimeError> {
        Ok(self.store.watch_minutes_for_user(user_id.value()).await?)
    }
}
