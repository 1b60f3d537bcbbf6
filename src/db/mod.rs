use crate::domain::SortOrder;
use crate::entities::{episodes, seasons, shows};
use crate::models::catalog::{EpisodeInput, SeasonInput, ShowInput};
use crate::models::ranking::{RankingEntry, TagKind};
use crate::models::rating::{RatingRecord, RecentRating, UpsertOutcome, UserRatingSummary};
use crate::rollup::Summary;
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, Statement,
    TransactionTrait,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Opens a transaction for the rating write path (upsert + count bump).
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        Ok(self.conn.begin().await?)
    }

    fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn ranking_repo(&self) -> repositories::ranking::RankingRepository {
        repositories::ranking::RankingRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    pub async fn upsert_rating_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        episode_id: i32,
        value: i32,
    ) -> Result<(RatingRecord, UpsertOutcome)> {
        self.rating_repo()
            .upsert_in(conn, user_id, episode_id, value)
            .await
    }

    pub async fn get_rating(&self, user_id: i32, episode_id: i32) -> Result<Option<RatingRecord>> {
        self.rating_repo().get(user_id, episode_id).await
    }

    pub async fn rating_values_for_episode(&self, episode_id: i32) -> Result<Vec<i32>> {
        self.rating_repo().values_for_episode(episode_id).await
    }

    pub async fn list_ratings_for_user(&self, user_id: i32) -> Result<Vec<RatingRecord>> {
        self.rating_repo().list_for_user(user_id).await
    }

    pub async fn count_ratings_by_value_for_user(
        &self,
        user_id: i32,
    ) -> Result<BTreeMap<i32, i64>> {
        self.rating_repo().count_by_value_for_user(user_id).await
    }

    pub async fn rating_summary_for_user(&self, user_id: i32) -> Result<UserRatingSummary> {
        self.rating_repo().summary_for_user(user_id).await
    }

    pub async fn watch_minutes_for_user(&self, user_id: i32) -> Result<i64> {
        self.rating_repo().watch_minutes_for_user(user_id).await
    }

    pub async fn last_ratings_for_user(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<RecentRating>> {
        self.rating_repo().last_for_user(user_id, limit).await
    }

    pub async fn last_ratings(&self, limit: u64) -> Result<Vec<RecentRating>> {
        self.rating_repo().last(limit).await
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn get_show(&self, id: i32) -> Result<Option<shows::Model>> {
        self.catalog_repo().get_show(id).await
    }

    pub async fn get_season(&self, id: i32) -> Result<Option<seasons::Model>> {
        self.catalog_repo().get_season(id).await
    }

    pub async fn get_episode(&self, id: i32) -> Result<Option<episodes::Model>> {
        self.catalog_repo().get_episode(id).await
    }

    pub async fn add_show(&self, input: &ShowInput) -> Result<shows::Model> {
        self.catalog_repo().insert_show(input).await
    }

    pub async fn add_season(&self, input: &SeasonInput) -> Result<seasons::Model> {
        self.catalog_repo().insert_season(input).await
    }

    pub async fn add_episode(&self, input: &EpisodeInput) -> Result<episodes::Model> {
        self.catalog_repo().insert_episode(input).await
    }

    pub async fn add_show_tag(&self, show_id: i32, kind: TagKind, name: &str) -> Result<()> {
        self.catalog_repo()
            .add_show_tag(show_id, kind.as_str(), name)
            .await
    }

    // ========================================================================
    // Summary writes (aggregation engine / repair only)
    // ========================================================================

    pub async fn increment_episode_rating_count_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        episode_id: i32,
    ) -> Result<()> {
        self.catalog_repo()
            .increment_episode_rating_count_in(conn, episode_id)
            .await
    }

    pub async fn set_episode_mean(&self, episode_id: i32, mean: f64) -> Result<()> {
        self.catalog_repo().set_episode_mean(episode_id, mean).await
    }

    pub async fn set_episode_summary(&self, episode_id: i32, summary: Summary) -> Result<()> {
        self.catalog_repo()
            .set_episode_summary(episode_id, summary)
            .await
    }

    pub async fn set_episode_rating_count(&self, episode_id: i32, count: i32) -> Result<()> {
        self.catalog_repo()
            .set_episode_rating_count(episode_id, count)
            .await
    }

    pub async fn set_season_summary(&self, season_id: i32, summary: Summary) -> Result<()> {
        self.catalog_repo()
            .set_season_summary(season_id, summary)
            .await
    }

    pub async fn set_season_rating_count(&self, season_id: i32, count: i32) -> Result<()> {
        self.catalog_repo()
            .set_season_rating_count(season_id, count)
            .await
    }

    pub async fn set_show_summary(&self, show_id: i32, summary: Summary) -> Result<()> {
        self.catalog_repo().set_show_summary(show_id, summary).await
    }

    pub async fn set_show_rating_count(&self, show_id: i32, count: i32) -> Result<()> {
        self.catalog_repo()
            .set_show_rating_count(show_id, count)
            .await
    }

    pub async fn episode_summaries_for_season(&self, season_id: i32) -> Result<Vec<Summary>> {
        self.catalog_repo()
            .episode_summaries_for_season(season_id)
            .await
    }

    pub async fn season_summaries_for_show(&self, show_id: i32) -> Result<Vec<Summary>> {
        self.catalog_repo().season_summaries_for_show(show_id).await
    }

    pub async fn all_episode_ids(&self) -> Result<Vec<i32>> {
        self.catalog_repo().all_episode_ids().await
    }

    pub async fn all_season_ids(&self) -> Result<Vec<i32>> {
        self.catalog_repo().all_season_ids().await
    }

    pub async fn all_show_ids(&self) -> Result<Vec<i32>> {
        self.catalog_repo().all_show_ids().await
    }

    // ========================================================================
    // Rankings
    // ========================================================================

    pub async fn ranking_shows(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().shows(min_count, order, limit).await
    }

    pub async fn ranking_shows_by_tag(
        &self,
        kind: TagKind,
        name: &str,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo()
            .shows_by_tag(kind, name, min_count, order, limit)
            .await
    }

    pub async fn ranking_seasons(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().seasons(min_count, order, limit).await
    }

    pub async fn ranking_episodes(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().episodes(min_count, order, limit).await
    }

    pub async fn ranking_pilots(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().pilots(min_count, order, limit).await
    }

    pub async fn ranking_user_shows(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().user_shows(user_id, order, limit).await
    }

    pub async fn ranking_user_seasons(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo()
            .user_seasons(user_id, order, limit)
            .await
    }

    pub async fn ranking_user_episodes(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo()
            .user_episodes(user_id, order, limit)
            .await
    }

    pub async fn ranking_user_pilots(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.ranking_repo().user_pilots(user_id, order, limit).await
    }
}
