//! Leaderboard API endpoints.
//!
//! Public scopes read through the TTL cache; user scopes are always fresh.
//! Every endpoint accepts `?order=ascending|descending` and `?limit=N`.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use crate::api::validation::{validate_id, validate_limit, validate_tag_name};
use crate::api::{ApiError, ApiResponse, AppState, RankingQuery};
use crate::domain::UserId;
use crate::models::ranking::{RankingEntry, RankingScope, TagKind};
use crate::services::RankingError;

impl From<RankingError> for ApiError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

fn parse_tag_kind(raw: &str) -> Result<TagKind, ApiError> {
    match raw {
        "genre" => Ok(TagKind::Genre),
        "channel" => Ok(TagKind::Channel),
        "nationality" => Ok(TagKind::Nationality),
        other => Err(ApiError::validation(format!(
            "Invalid tag kind: {}. Expected genre, channel or nationality",
            other
        ))),
    }
}

async fn ranking(
    state: &AppState,
    scope: RankingScope,
    query: RankingQuery,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let limit = query.limit.map(validate_limit).transpose()?;
    let entries = state.rankings.get_ranking(scope, query.order, limit).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// `GET /api/rankings/shows`
pub async fn top_shows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    ranking(&state, RankingScope::Shows, query).await
}

/// `GET /api/rankings/shows/{kind}/{name}`
///
/// Show ranking restricted to one tag, e.g. `/rankings/shows/genre/drama`.
pub async fn top_shows_by_tag(
    State(state): State<Arc<AppState>>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let kind = parse_tag_kind(&kind)?;
    let name = validate_tag_name(&name)?.to_string();
    ranking(&state, RankingScope::ShowsByTag { kind, name }, query).await
}

/// `GET /api/rankings/seasons`
pub async fn top_seasons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    ranking(&state, RankingScope::Seasons, query).await
}

/// `GET /api/rankings/episodes`
pub async fn top_episodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    ranking(&state, RankingScope::Episodes, query).await
}

/// `GET /api/rankings/pilots`
///
/// First episodes of first seasons only.
pub async fn top_pilots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    ranking(&state, RankingScope::Pilots, query).await
}

/// `GET /api/users/{user_id}/rankings/shows`
pub async fn user_top_shows(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let user = UserId::new(validate_id("user", user_id)?);
    ranking(&state, RankingScope::UserShows(user), query).await
}

/// `GET /api/users/{user_id}/rankings/seasons`
pub async fn user_top_seasons(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let user = UserId::new(validate_id("user", user_id)?);
    ranking(&state, RankingScope::UserSeasons(user), query).await
}

/// `GET /api/users/{user_id}/rankings/episodes`
pub async fn user_top_episodes(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let user = UserId::new(validate_id("user", user_id)?);
    ranking(&state, RankingScope::UserEpisodes(user), query).await
}

/// `GET /api/users/{user_id}/rankings/pilots`
pub async fn user_top_pilots(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankingEntry>>>, ApiError> {
    let user = UserId::new(validate_id("user", user_id)?);
    ranking(&state, RankingScope::UserPilots(user), query).await
}
