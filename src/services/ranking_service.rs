use crate::domain::SortOrder;
use crate::models::ranking::{RankingEntry, RankingScope};
use thiserror::Error;

/// Domain errors for ranking reads.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RankingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RankingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Leaderboard reads over the denormalized summaries.
///
/// Public scopes are served through a TTL cache and filtered by the
/// per-kind minimum-count thresholds; user scopes are always computed
/// fresh from raw rating rows and never filtered.
#[async_trait::async_trait]
pub trait RankingService: Send + Sync {
    /// Returns the ranking for `scope`, best-first (or worst-first for
    /// ascending order), truncated to `limit` rows when given.
    ///
    /// A missing `limit` falls back to the configured default; any limit is
    /// clamped to the hard cap.
    async fn get_ranking(
        &self,
        scope: RankingScope,
        order: SortOrder,
        limit: Option<u64>,
    ) -> Result<Vec<RankingEntry>, RankingError>;
}
