use serde::{Deserialize, Serialize};

use crate::domain::SortOrder;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /api/ratings`. IDs arrive raw and are validated in the
/// handler before being promoted to domain types.
#[derive(Debug, Deserialize)]
pub struct RateEpisodeRequest {
    pub user_id: i32,
    pub episode_id: i32,
    pub value: i32,
}

/// Shared query parameters of the ranking endpoints.
#[derive(Debug, Deserialize, Default)]
pub struct RankingQuery {
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<u64>,
}

/// One bar of a user's rating histogram.
#[derive(Debug, Serialize)]
pub struct HistogramBucket {
    pub value: i32,
    pub count: i64,
}

/// Profile header numbers: rating totals plus estimated watch time.
#[derive(Debug, Serialize)]
pub struct UserStatsDto {
    pub avg_rating: f64,
    pub rating_count: i64,
    pub watch_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct WatchTimeDto {
    pub minutes: i64,
}
