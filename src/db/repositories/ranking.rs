use crate::domain::{SortOrder, UnitKind};
use crate::entities::{episodes, prelude::*, ratings, seasons, show_tags, shows};
use crate::models::ranking::{RankingEntry, TagKind};
use anyhow::Result;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, Order, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

/// Repository behind the leaderboards.
///
/// Public rankings read the denormalized summaries and exclude entities at
/// or below the per-kind eligibility threshold; user rankings aggregate that
/// user's raw rating rows and apply no threshold. Both tie-break equal means
/// by `rating_count` in the same direction as the primary order.
pub struct RankingRepository {
    conn: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct SeasonRankingRow {
    id: i32,
    number: i32,
    show_name: String,
    mean_rating: f64,
    rating_count: i32,
}

#[derive(Debug, FromQueryResult)]
struct EpisodeRankingRow {
    id: i32,
    number: i32,
    title: String,
    season_number: i32,
    show_name: String,
    mean_rating: f64,
    rating_count: i32,
}

#[derive(Debug, FromQueryResult)]
struct UserShowRow {
    id: i32,
    name: String,
    mean_rating: f64,
    rating_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct UserSeasonRow {
    id: i32,
    number: i32,
    show_name: String,
    mean_rating: f64,
    rating_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct UserEpisodeRow {
    id: i32,
    number: i32,
    title: String,
    season_number: i32,
    show_name: String,
    mean_rating: f64,
    rating_count: i64,
}

const fn direction(order: SortOrder) -> Order {
    match order {
        SortOrder::Ascending => Order::Asc,
        SortOrder::Descending => Order::Desc,
    }
}

impl RankingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Public rankings over denormalized summaries
    // ========================================================================

    /// Top/bottom shows. `min_count` is exclusive: an entity with
    /// `rating_count <= min_count` never surfaces, however extreme its mean.
    pub async fn shows(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows = Shows::find()
            .filter(shows::Column::RatingCount.gt(min_count))
            .order_by(shows::Column::MeanRating, direction(order))
            .order_by(shows::Column::RatingCount, direction(order))
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| RankingEntry {
                kind: UnitKind::Show,
                id: m.id,
                name: m.name,
                show_name: None,
                season_number: None,
                episode_number: None,
                mean_rating: m.mean_rating,
                rating_count: i64::from(m.rating_count),
            })
            .collect())
    }

    /// Shows restricted to one tag value (genre, channel or nationality).
    pub async fn shows_by_tag(
        &self,
        kind: TagKind,
        name: &str,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows = Shows::find()
            .join(JoinType::InnerJoin, shows::Relation::ShowTags.def())
            .filter(show_tags::Column::Kind.eq(kind.as_str()))
            .filter(show_tags::Column::Name.eq(name))
            .filter(shows::Column::RatingCount.gt(min_count))
            .order_by(shows::Column::MeanRating, direction(order))
            .order_by(shows::Column::RatingCount, direction(order))
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| RankingEntry {
                kind: UnitKind::Show,
                id: m.id,
                name: m.name,
                show_name: None,
                season_number: None,
                episode_number: None,
                mean_rating: m.mean_rating,
                rating_count: i64::from(m.rating_count),
            })
            .collect())
    }

    pub async fn seasons(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows = Seasons::find()
            .select_only()
            .column(seasons::Column::Id)
            .column(seasons::Column::Number)
            .column(seasons::Column::MeanRating)
            .column(seasons::Column::RatingCount)
            .column_as(shows::Column::Name, "show_name")
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(seasons::Column::RatingCount.gt(min_count))
            .order_by(seasons::Column::MeanRating, direction(order))
            .order_by(seasons::Column::RatingCount, direction(order))
            .limit(limit)
            .into_model::<SeasonRankingRow>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| RankingEntry {
                kind: UnitKind::Season,
                id: r.id,
                name: format!("Season {}", r.number),
                show_name: Some(r.show_name),
                season_number: Some(r.number),
                episode_number: None,
                mean_rating: r.mean_rating,
                rating_count: i64::from(r.rating_count),
            })
            .collect())
    }

    pub async fn episodes(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows = self
            .episode_query(min_count, order, limit, false)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_episode_row).collect())
    }

    /// Season 1 episode 1 across all shows.
    pub async fn pilots(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows = self
            .episode_query(min_count, order, limit, true)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_episode_row).collect())
    }

    fn episode_query(
        &self,
        min_count: i32,
        order: SortOrder,
        limit: u64,
        pilots_only: bool,
    ) -> sea_orm::Selector<sea_orm::SelectModel<EpisodeRankingRow>> {
        let mut query = Episodes::find()
            .select_only()
            .column(episodes::Column::Id)
            .column(episodes::Column::Number)
            .column(episodes::Column::Title)
            .column(episodes::Column::MeanRating)
            .column(episodes::Column::RatingCount)
            .column_as(seasons::Column::Number, "season_number")
            .column_as(shows::Column::Name, "show_name")
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(episodes::Column::RatingCount.gt(min_count));

        if pilots_only {
            query = query
                .filter(seasons::Column::Number.eq(1))
                .filter(episodes::Column::Number.eq(1));
        }

        query
            .order_by(episodes::Column::MeanRating, direction(order))
            .order_by(episodes::Column::RatingCount, direction(order))
            .limit(limit)
            .into_model::<EpisodeRankingRow>()
    }

    fn map_episode_row(r: EpisodeRankingRow) -> RankingEntry {
        RankingEntry {
            kind: UnitKind::Episode,
            id: r.id,
            name: r.title,
            show_name: Some(r.show_name),
            season_number: Some(r.season_number),
            episode_number: Some(r.number),
            mean_rating: r.mean_rating,
            rating_count: i64::from(r.rating_count),
        }
    }

    // ========================================================================
    // User rankings over raw rating rows
    // ========================================================================

    /// The user's own shows ranked by the mean of their ratings underneath.
    /// No eligibility threshold: this is the user's complete history.
    pub async fn user_shows(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows: Vec<UserShowRow> = Ratings::find()
            .select_only()
            .column_as(shows::Column::Id, "id")
            .column_as(shows::Column::Name, "name")
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col((Ratings, ratings::Column::Value)))),
                "mean_rating",
            )
            .column_as(ratings::Column::Value.count(), "rating_count")
            .join(JoinType::InnerJoin, ratings::Relation::Episodes.def())
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(ratings::Column::UserId.eq(user_id))
            .group_by(shows::Column::Id)
            .group_by(shows::Column::Name)
            .into_model()
            .all(&self.conn)
            .await?;

        let entries = rows
            .into_iter()
            .map(|r| RankingEntry {
                kind: UnitKind::Show,
                id: r.id,
                name: r.name,
                show_name: None,
                season_number: None,
                episode_number: None,
                mean_rating: r.mean_rating,
                rating_count: r.rating_count,
            })
            .collect();

        Ok(Self::sort_and_truncate(entries, order, limit))
    }

    pub async fn user_seasons(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        let rows: Vec<UserSeasonRow> = Ratings::find()
            .select_only()
            .column_as(seasons::Column::Id, "id")
            .column_as(seasons::Column::Number, "number")
            .column_as(shows::Column::Name, "show_name")
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col((Ratings, ratings::Column::Value)))),
                "mean_rating",
            )
            .column_as(ratings::Column::Value.count(), "rating_count")
            .join(JoinType::InnerJoin, ratings::Relation::Episodes.def())
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(ratings::Column::UserId.eq(user_id))
            .group_by(seasons::Column::Id)
            .group_by(seasons::Column::Number)
            .group_by(shows::Column::Name)
            .into_model()
            .all(&self.conn)
            .await?;

        let entries = rows
            .into_iter()
            .map(|r| RankingEntry {
                kind: UnitKind::Season,
                id: r.id,
                name: format!("Season {}", r.number),
                show_name: Some(r.show_name),
                season_number: Some(r.number),
                episode_number: None,
                mean_rating: r.mean_rating,
                rating_count: r.rating_count,
            })
            .collect();

        Ok(Self::sort_and_truncate(entries, order, limit))
    }

    pub async fn user_episodes(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.user_episode_scoped(user_id, order, limit, false).await
    }

    pub async fn user_pilots(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>> {
        self.user_episode_scoped(user_id, order, limit, true).await
    }

    async fn user_episode_scoped(
        &self,
        user_id: i32,
        order: SortOrder,
        limit: u64,
        pilots_only: bool,
    ) -> Result<Vec<RankingEntry>> {
        let mut query = Ratings::find()
            .select_only()
            .column_as(episodes::Column::Id, "id")
            .column_as(episodes::Column::Number, "number")
            .column_as(episodes::Column::Title, "title")
            .column_as(seasons::Column::Number, "season_number")
            .column_as(shows::Column::Name, "show_name")
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col((Ratings, ratings::Column::Value)))),
                "mean_rating",
            )
            .column_as(ratings::Column::Value.count(), "rating_count")
            .join(JoinType::InnerJoin, ratings::Relation::Episodes.def())
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(ratings::Column::UserId.eq(user_id));

        if pilots_only {
            query = query
                .filter(seasons::Column::Number.eq(1))
                .filter(episodes::Column::Number.eq(1));
        }

        let rows: Vec<UserEpisodeRow> = query
            .group_by(episodes::Column::Id)
            .group_by(episodes::Column::Number)
            .group_by(episodes::Column::Title)
            .group_by(seasons::Column::Number)
            .group_by(shows::Column::Name)
            .into_model()
            .all(&self.conn)
            .await?;

        let entries = rows
            .into_iter()
            .map(|r| RankingEntry {
                kind: UnitKind::Episode,
                id: r.id,
                name: r.title,
                show_name: Some(r.show_name),
                season_number: Some(r.season_number),
                episode_number: Some(r.number),
                mean_rating: r.mean_rating,
                rating_count: r.rating_count,
            })
            .collect();

        Ok(Self::sort_and_truncate(entries, order, limit))
    }

    /// Ordering for the user scopes happens here rather than in SQL: the
    /// grouped result is one row per rated show/season/episode of a single
    /// user, small enough to sort in memory.
    fn sort_and_truncate(
        mut entries: Vec<RankingEntry>,
        order: SortOrder,
        limit: u64,
    ) -> Vec<RankingEntry> {
        entries.sort_by(|a, b| {
            let primary = a
                .mean_rating
                .partial_cmp(&b.mean_rating)
                .unwrap_or(std::cmp::Ordering::Equal);
            let tie = a.rating_count.cmp(&b.rating_count);
            let cmp = primary.then(tie);
            if order.is_ascending() { cmp } else { cmp.reverse() }
        });
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        entries
    }
}
