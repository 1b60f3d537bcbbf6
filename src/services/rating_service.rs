//! Domain service for the rating write path and the rating read contracts.
//!
//! This module provides the [`RatingService`] trait: the aggregation engine
//! that propagates a rating write up the episode → season → show chain, plus
//! the read contracts the profile pages are built on.

use crate::domain::{EpisodeId, RatingValue, UserId};
use crate::models::rating::{RatingRecord, RecentRating, UserRatingSummary};
use std::collections::BTreeMap;
use thiserror::Error;

/// Domain errors for rating operations.
#[derive(Debug, Error)]
pub enum RatingError {
    /// The rated episode does not exist — a caller error, nothing written.
    #[error("Episode {0} not found")]
    UnknownEpisode(EpisodeId),

    /// A chain lookup failed mid-write (an episode's season or a season's
    /// show reference is missing). Fatal for this write; any already
    /// committed rating row remains in place.
    #[error("Broken chain above episode {episode_id}: {detail}")]
    ChainBroken { episode_id: EpisodeId, detail: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RatingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RatingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Units touched by a repair pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairReport {
    pub episodes: usize,
    pub seasons: usize,
    pub shows: usize,
}

/// Domain service trait for ratings.
///
/// `record_rating` is the single write entry point; everything else is a
/// pure read returning plain data structures.
#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    /// Records a rating and rolls the summaries up the chain.
    ///
    /// Inserts or overwrites the (user, episode) rating row, then recomputes
    /// the episode mean from its rating rows and the season and show
    /// summaries from their rated children. The raw rating commits before
    /// the summary writes: a failure mid-chain leaves summaries stale but
    /// never loses the rating.
    ///
    /// The value must already be validated as in range by the caller.
    ///
    /// # Errors
    ///
    /// - [`RatingError::UnknownEpisode`] if the episode does not exist
    /// - [`RatingError::ChainBroken`] if the season or show lookup fails
    /// - [`RatingError::Database`] on storage failures
    async fn record_rating(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        value: RatingValue,
    ) -> Result<RatingRecord, RatingError>;

    /// Looks up one user's rating of one episode.
    async fn get_rating(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
    ) -> Result<Option<RatingRecord>, RatingError>;

    /// All ratings of one user, unordered.
    async fn list_ratings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RatingRecord>, RatingError>;

    /// Histogram of rating value to occurrence count for one user.
    async fn count_by_value_for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<i32, i64>, RatingError>;

    /// Average rating and total count over one user's history.
    async fn rating_summary_for_user(
        &self,
        user_id: UserId,
    ) -> Result<UserRatingSummary, RatingError>;

    /// The user's most recent ratings with chain context, newest first.
    async fn last_ratings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecentRating>, RatingError>;

    /// The site-wide recent-activity feed.
    async fn recent_ratings(&self) -> Result<Vec<RecentRating>, RatingError>;

    /// Recomputes every summary in the database from source rows.
    ///
    /// The out-of-band fix for summaries left stale by a mid-chain failure.
    async fn repair_summaries(&self) -> Result<RepairReport, RatingError>;
}
