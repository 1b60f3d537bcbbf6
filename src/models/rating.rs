use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// A stored rating row: user X rated episode Y the value V.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: i32,
    pub episode_id: i32,
    pub value: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Which branch an upsert took.
///
/// Downstream count handling depends on this signal: a created rating bumps
/// the episode's `rating_count`, an update must not. The branch is reported
/// by the store because it cannot be re-derived by the caller under
/// concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Average rating and total count over one user's whole history.
#[derive(Debug, Clone, Serialize)]
pub struct UserRatingSummary {
    pub avg_rating: f64,
    pub rating_count: i64,
}

/// A recent rating joined with its chain context, for profile pages and the
/// site-wide recent-activity feed.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct RecentRating {
    pub user_id: i32,
    pub episode_id: i32,
    pub value: i32,
    pub updated_at: String,
    pub episode_number: i32,
    pub episode_title: String,
    pub season_number: i32,
    pub show_name: String,
}
