use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::MemoryRankingCache;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    RankingService, RatingService, SeaOrmRankingService, SeaOrmRatingService,
    SeaOrmWatchTimeService, WatchTimeService,
};

mod error;
mod rankings;
mod ratings;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use std::time::Duration;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub ratings: Arc<dyn RatingService>,

    pub rankings: Arc<dyn RankingService>,

    pub watch_time: Arc<dyn WatchTimeService>,

    pub start_time: std::time::Instant,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    create_app_state(config, store)
}

/// Wires the services over an already opened store. Tests use this to run
/// the full router against a temporary database.
pub fn create_app_state(config: Config, store: Store) -> anyhow::Result<Arc<AppState>> {
    let cache = Arc::new(MemoryRankingCache::new(Duration::from_secs(
        config.ranking.cache_ttl_secs,
    )));

    let ratings = Arc::new(SeaOrmRatingService::new(store.clone()));
    let rankings = Arc::new(SeaOrmRankingService::new(
        store.clone(),
        cache,
        config.ranking.clone(),
    ));
    let watch_time = Arc::new(SeaOrmWatchTimeService::new(store.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        ratings,
        rankings,
        watch_time,
        start_time: std::time::Instant::now(),
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/ratings", post(ratings::rate_episode))
        .route("/ratings/recent", get(ratings::recent_ratings))
        .route("/users/{user_id}/ratings", get(ratings::list_user_ratings))
        .route(
            "/users/{user_id}/ratings/recent",
            get(ratings::user_recent_ratings),
        )
        .route(
            "/users/{user_id}/ratings/histogram",
            get(ratings::user_histogram),
        )
        .route(
            "/users/{user_id}/ratings/{episode_id}",
            get(ratings::get_user_rating),
        )
        .route("/users/{user_id}/stats", get(ratings::user_stats))
        .route("/users/{user_id}/watch-time", get(ratings::user_watch_time))
        .route("/rankings/shows", get(rankings::top_shows))
        .route(
            "/rankings/shows/{kind}/{name}",
            get(rankings::top_shows_by_tag),
        )
        .route("/rankings/seasons", get(rankings::top_seasons))
        .route("/rankings/episodes", get(rankings::top_episodes))
        .route("/rankings/pilots", get(rankings::top_pilots))
        .route(
            "/users/{user_id}/rankings/shows",
            get(rankings::user_top_shows),
        )
        .route(
            "/users/{user_id}/rankings/seasons",
            get(rankings::user_top_seasons),
        )
        .route(
            "/users/{user_id}/rankings/episodes",
            get(rankings::user_top_episodes),
        )
        .route(
            "/users/{user_id}/rankings/pilots",
            get(rankings::user_top_pilots),
        )
        .route("/system/health", get(system::get_health))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
