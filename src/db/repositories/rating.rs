use crate::entities::{episodes, prelude::*, ratings, seasons, shows};
use crate::models::rating::{RatingRecord, RecentRating, UpsertOutcome, UserRatingSummary};
use crate::rollup;
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use std::collections::BTreeMap;

/// Repository over the rating rows: the durable record of
/// "user X rated episode Y the value V at time T".
pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: ratings::Model) -> RatingRecord {
        RatingRecord {
            user_id: m.user_id,
            episode_id: m.episode_id,
            value: m.value,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    /// Inserts a rating on first rating, overwrites `value` and `updated_at`
    /// on re-rating. The taken branch is reported to the caller: it drives
    /// the episode count increment downstream and cannot be re-derived by
    /// re-querying under concurrent writers.
    ///
    /// Generic over the connection so the aggregation engine can run it
    /// inside the transaction that also bumps the episode count.
    pub async fn upsert_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        episode_id: i32,
        value: i32,
    ) -> Result<(RatingRecord, UpsertOutcome)> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = Ratings::find_by_id((user_id, episode_id)).one(conn).await?;

        match existing {
            Some(row) => {
                let mut active: ratings::ActiveModel = row.into();
                active.value = Set(value);
                active.updated_at = Set(now);
                let updated = active.update(conn).await?;
                Ok((Self::map_model(updated), UpsertOutcome::Updated))
            }
            None => {
                let active = ratings::ActiveModel {
                    user_id: Set(user_id),
                    episode_id: Set(episode_id),
                    value: Set(value),
                    created_at: Set(now.clone()),
                    updated_at: Set(now),
                };
                let inserted = active.insert(conn).await?;
                Ok((Self::map_model(inserted), UpsertOutcome::Created))
            }
        }
    }

    pub async fn get(&self, user_id: i32, episode_id: i32) -> Result<Option<RatingRecord>> {
        let row = Ratings::find_by_id((user_id, episode_id))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_model))
    }

    /// All raw values for one episode, the source the episode mean is
    /// recomputed from on every write.
    pub async fn values_for_episode(&self, episode_id: i32) -> Result<Vec<i32>> {
        let values: Vec<i32> = Ratings::find()
            .select_only()
            .column(ratings::Column::Value)
            .filter(ratings::Column::EpisodeId.eq(episode_id))
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(values)
    }

    /// Unordered; drives the watch-time calculator and personal leaderboards.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<RatingRecord>> {
        let rows = Ratings::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Histogram of rating value to occurrence count for one user.
    pub async fn count_by_value_for_user(&self, user_id: i32) -> Result<BTreeMap<i32, i64>> {
        let rows: Vec<(i32, i64)> = Ratings::find()
            .select_only()
            .column(ratings::Column::Value)
            .column_as(ratings::Column::Value.count(), "total")
            .filter(ratings::Column::UserId.eq(user_id))
            .group_by(ratings::Column::Value)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Average rating and total count over the user's history. Zeroes for a
    /// user with no ratings, not an error.
    pub async fn summary_for_user(&self, user_id: i32) -> Result<UserRatingSummary> {
        let values: Vec<i32> = Ratings::find()
            .select_only()
            .column(ratings::Column::Value)
            .filter(ratings::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(UserRatingSummary {
            avg_rating: rollup::mean_of(&values).unwrap_or(0.0),
            rating_count: values.len() as i64,
        })
    }

    /// Total minutes of content underneath the user's ratings: the sum of
    /// the owning show's fixed minutes-per-episode over every rated episode.
    pub async fn watch_minutes_for_user(&self, user_id: i32) -> Result<i64> {
        let minutes: Vec<i32> = Ratings::find()
            .select_only()
            .column(shows::Column::EpisodeMinutes)
            .join(JoinType::InnerJoin, ratings::Relation::Episodes.def())
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .filter(ratings::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(minutes.into_iter().map(i64::from).sum())
    }

    /// Most recent ratings of one user with their chain context, newest
    /// first.
    pub async fn last_for_user(&self, user_id: i32, limit: u64) -> Result<Vec<RecentRating>> {
        Ok(Self::recent_query()
            .filter(ratings::Column::UserId.eq(user_id))
            .limit(limit)
            .into_model::<RecentRating>()
            .all(&self.conn)
            .await?)
    }

    /// Most recent ratings across all users, newest first.
    pub async fn last(&self, limit: u64) -> Result<Vec<RecentRating>> {
        Ok(Self::recent_query()
            .limit(limit)
            .into_model::<RecentRating>()
            .all(&self.conn)
            .await?)
    }

    fn recent_query() -> sea_orm::Select<Ratings> {
        Ratings::find()
            .select_only()
            .column(ratings::Column::UserId)
            .column(ratings::Column::EpisodeId)
            .column(ratings::Column::Value)
            .column(ratings::Column::UpdatedAt)
            .column_as(episodes::Column::Number, "episode_number")
            .column_as(episodes::Column::Title, "episode_title")
            .column_as(seasons::Column::Number, "season_number")
            .column_as(shows::Column::Name, "show_name")
            .join(JoinType::InnerJoin, ratings::Relation::Episodes.def())
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .order_by_desc(ratings::Column::UpdatedAt)
    }
}
