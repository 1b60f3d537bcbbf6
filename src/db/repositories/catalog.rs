use crate::entities::{episodes, prelude::*, seasons, show_tags, shows};
use crate::models::catalog::{EpisodeInput, SeasonInput, ShowInput};
use crate::rollup::Summary;
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set,
};

/// Repository over the unit hierarchy (shows, seasons, episodes) and the
/// denormalized summary pair each unit carries.
///
/// Summary columns are written exclusively through this repository, and only
/// by the aggregation engine and the repair pass.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn get_show(&self, id: i32) -> Result<Option<shows::Model>> {
        Ok(Shows::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_season(&self, id: i32) -> Result<Option<seasons::Model>> {
        Ok(Seasons::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_episode(&self, id: i32) -> Result<Option<episodes::Model>> {
        Ok(Episodes::find_by_id(id).one(&self.conn).await?)
    }

    // ========================================================================
    // Inserts (seeding / catalog import)
    // ========================================================================

    pub async fn insert_show(&self, input: &ShowInput) -> Result<shows::Model> {
        let active = shows::ActiveModel {
            name: Set(input.name.clone()),
            slug: Set(input.slug.clone()),
            episode_minutes: Set(input.episode_minutes),
            mean_rating: Set(0.0),
            rating_count: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Ok(active.insert(&self.conn).await?)
    }

    pub async fn insert_season(&self, input: &SeasonInput) -> Result<seasons::Model> {
        let active = seasons::ActiveModel {
            show_id: Set(input.show_id),
            number: Set(input.number),
            mean_rating: Set(0.0),
            rating_count: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Ok(active.insert(&self.conn).await?)
    }

    pub async fn insert_episode(&self, input: &EpisodeInput) -> Result<episodes::Model> {
        let active = episodes::ActiveModel {
            season_id: Set(input.season_id),
            number: Set(input.number),
            title: Set(input.title.clone()),
            mean_rating: Set(0.0),
            rating_count: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Ok(active.insert(&self.conn).await?)
    }

    pub async fn add_show_tag(&self, show_id: i32, kind: &str, name: &str) -> Result<()> {
        let active = show_tags::ActiveModel {
            show_id: Set(show_id),
            kind: Set(kind.to_string()),
            name: Set(name.to_string()),
        };
        ShowTags::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    show_tags::Column::ShowId,
                    show_tags::Column::Kind,
                    show_tags::Column::Name,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Summary writes
    // ========================================================================

    /// Bumps the episode's rating count by one. Runs inside the same
    /// transaction as the rating upsert so two concurrent ratings on the
    /// same episode cannot both read the pre-update count.
    pub async fn increment_episode_rating_count_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        episode_id: i32,
    ) -> Result<()> {
        Episodes::update_many()
            .col_expr(
                episodes::Column::RatingCount,
                Expr::col(episodes::Column::RatingCount).add(1),
            )
            .filter(episodes::Column::Id.eq(episode_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn set_episode_mean(&self, episode_id: i32, mean: f64) -> Result<()> {
        Episodes::update_many()
            .col_expr(episodes::Column::MeanRating, Expr::value(mean))
            .filter(episodes::Column::Id.eq(episode_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_episode_summary(&self, episode_id: i32, summary: Summary) -> Result<()> {
        Episodes::update_many()
            .col_expr(episodes::Column::MeanRating, Expr::value(summary.mean_rating))
            .col_expr(
                episodes::Column::RatingCount,
                Expr::value(summary.rating_count),
            )
            .filter(episodes::Column::Id.eq(episode_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_episode_rating_count(&self, episode_id: i32, count: i32) -> Result<()> {
        Episodes::update_many()
            .col_expr(episodes::Column::RatingCount, Expr::value(count))
            .filter(episodes::Column::Id.eq(episode_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_season_summary(&self, season_id: i32, summary: Summary) -> Result<()> {
        Seasons::update_many()
            .col_expr(seasons::Column::MeanRating, Expr::value(summary.mean_rating))
            .col_expr(
                seasons::Column::RatingCount,
                Expr::value(summary.rating_count),
            )
            .filter(seasons::Column::Id.eq(season_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Used when a season has no rated children: the stale mean stays in
    /// place, only the count is reset.
    pub async fn set_season_rating_count(&self, season_id: i32, count: i32) -> Result<()> {
        Seasons::update_many()
            .col_expr(seasons::Column::RatingCount, Expr::value(count))
            .filter(seasons::Column::Id.eq(season_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_show_summary(&self, show_id: i32, summary: Summary) -> Result<()> {
        Shows::update_many()
            .col_expr(shows::Column::MeanRating, Expr::value(summary.mean_rating))
            .col_expr(shows::Column::RatingCount, Expr::value(summary.rating_count))
            .filter(shows::Column::Id.eq(show_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_show_rating_count(&self, show_id: i32, count: i32) -> Result<()> {
        Shows::update_many()
            .col_expr(shows::Column::RatingCount, Expr::value(count))
            .filter(shows::Column::Id.eq(show_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Child summaries for the rollup
    // ========================================================================

    pub async fn episode_summaries_for_season(&self, season_id: i32) -> Result<Vec<Summary>> {
        let rows: Vec<(f64, i32)> = Episodes::find()
            .select_only()
            .column(episodes::Column::MeanRating)
            .column(episodes::Column::RatingCount)
            .filter(episodes::Column::SeasonId.eq(season_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(mean_rating, rating_count)| Summary {
                mean_rating,
                rating_count,
            })
            .collect())
    }

    pub async fn season_summaries_for_show(&self, show_id: i32) -> Result<Vec<Summary>> {
        let rows: Vec<(f64, i32)> = Seasons::find()
            .select_only()
            .column(seasons::Column::MeanRating)
            .column(seasons::Column::RatingCount)
            .filter(seasons::Column::ShowId.eq(show_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(mean_rating, rating_count)| Summary {
                mean_rating,
                rating_count,
            })
            .collect())
    }

    // ========================================================================
    // Full scans for the repair pass
    // ========================================================================

    pub async fn all_episode_ids(&self) -> Result<Vec<i32>> {
        let ids: Vec<i32> = Episodes::find()
            .select_only()
            .column(episodes::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    pub async fn all_season_ids(&self) -> Result<Vec<i32>> {
        let ids: Vec<i32> = Seasons::find()
            .select_only()
            .column(seasons::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    pub async fn all_show_ids(&self) -> Result<Vec<i32>> {
        let ids: Vec<i32> = Shows::find()
            .select_only()
            .column(shows::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }
}
