//! Rating API endpoints.
//!
//! Handlers only do HTTP/JSON mapping and edge validation; the write path
//! and all aggregation live in [`RatingService`].

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use crate::api::validation::{validate_id, validate_rating_value};
use crate::api::{ApiError, ApiResponse, AppState, HistogramBucket, RateEpisodeRequest, UserStatsDto, WatchTimeDto};
use crate::domain::{EpisodeId, RatingValue, UserId};
use crate::models::rating::{RatingRecord, RecentRating};
use crate::services::{RatingError, WatchTimeError};

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::UnknownEpisode(id) => Self::episode_not_found(id),
            RatingError::ChainBroken { .. } => Self::internal(err.to_string()),
            RatingError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<WatchTimeError> for ApiError {
    fn from(err: WatchTimeError) -> Self {
        match err {
            WatchTimeError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// Records a rating.
///
/// # Endpoint
/// `POST /api/ratings`
///
/// Inserts or overwrites the caller's rating of the episode and rolls the
/// denormalized summaries up the chain before responding.
pub async fn rate_episode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RateEpisodeRequest>,
) -> Result<Json<ApiResponse<RatingRecord>>, ApiError> {
    let user_id = validate_id("user", request.user_id)?;
    let episode_id = validate_id("episode", request.episode_id)?;

    let max_value = state.config.read().await.rating.max_value;
    let value = validate_rating_value(request.value, max_value)?;

    let record = state
        .ratings
        .record_rating(
            UserId::new(user_id),
            EpisodeId::new(episode_id),
            RatingValue::new(value),
        )
        .await?;

    Ok(Json(ApiResponse::success(record)))
}

/// Returns one user's rating of one episode.
///
/// # Endpoint
/// `GET /api/users/{user_id}/ratings/{episode_id}`
pub async fn get_user_rating(
    State(state): State<Arc<AppState>>,
    Path((user_id, episode_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<RatingRecord>>, ApiError> {
    let user_id = validate_id("user", user_id)?;
    let episode_id = validate_id("episode", episode_id)?;

    let record = state
        .ratings
        .get_rating(UserId::new(user_id), EpisodeId::new(episode_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Rating for episode", episode_id))?;

    Ok(Json(ApiResponse::success(record)))
}

/// Returns all of a user's ratings.
///
/// # Endpoint
/// `GET /api/users/{user_id}/ratings`
pub async fn list_user_ratings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<RatingRecord>>>, ApiError> {
    let user_id = validate_id("user", user_id)?;
    let records = state.ratings.list_ratings_for_user(UserId::new(user_id)).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Returns a user's rating-value histogram.
///
/// # Endpoint
/// `GET /api/users/{user_id}/ratings/histogram`
///
/// Buckets are sorted by rating value; values the user never gave are absent.
pub async fn user_histogram(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<HistogramBucket>>>, ApiError> {
    let user_id = validate_id("user", user_id)?;
    let counts = state
        .ratings
        .count_by_value_for_user(UserId::new(user_id))
        .await?;

    let buckets = counts
        .into_iter()
        .map(|(value, count)| HistogramBucket { value, count })
        .collect();

    Ok(Json(ApiResponse::success(buckets)))
}

/// Returns a user's most recent ratings with chain context, newest first.
///
/// # Endpoint
/// `GET /api/users/{user_id}/ratings/recent`
pub async fn user_recent_ratings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<RecentRating>>>, ApiError> {
    let user_id = validate_id("user", user_id)?;
    let recent = state
        .ratings
        .last_ratings_for_user(UserId::new(user_id))
        .await?;
    Ok(Json(ApiResponse::success(recent)))
}

/// Returns the site-wide recent-activity feed.
///
/// # Endpoint
/// `GET /api/ratings/recent`
pub async fn recent_ratings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RecentRating>>>, ApiError> {
    let recent = state.ratings.recent_ratings().await?;
    Ok(Json(ApiResponse::success(recent)))
}

/// Returns a user's profile header numbers.
///
/// # Endpoint
/// `GET /api/users/{user_id}/stats`
pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserStatsDto>>, ApiError> {
    let user_id = UserId::new(validate_id("user", user_id)?);

    let summary = state.ratings.rating_summary_for_user(user_id).await?;
    let watch_minutes = state.watch_time.watch_minutes(user_id).await?;

    Ok(Json(ApiResponse::success(UserStatsDto {
        avg_rating: summary.avg_rating,
        rating_count: summary.rating_count,
        watch_minutes,
    })))
}

/// Returns a user's estimated watch time.
///
/// # Endpoint
/// `GET /api/users/{user_id}/watch-time`
pub async fn user_watch_time(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<WatchTimeDto>>, ApiError> {
    let user_id = validate_id("user", user_id)?;
    let minutes = state.watch_time.watch_minutes(UserId::new(user_id)).await?;
    Ok(Json(ApiResponse::success(WatchTimeDto { minutes })))
}
