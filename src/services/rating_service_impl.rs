//! `SeaORM`-backed implementation of the rating service.

use crate::constants::{RECENT_RATINGS_PROFILE_LIMIT, RECENT_RATINGS_SITE_LIMIT};
use crate::db::Store;
use crate::domain::{EpisodeId, RatingValue, UserId};
use crate::models::catalog::Chain;
use crate::models::rating::{RatingRecord, RecentRating, UserRatingSummary};
use crate::rollup::{self, Summary};
use crate::services::rating_service::{RatingError, RatingService, RepairReport};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// One async lock per show, created lazily. Serializing writers per chain
/// keeps the read-recompute-write summary updates free of lost updates
/// without blocking ratings on unrelated shows.
#[derive(Default)]
struct ChainLocks {
    inner: Mutex<HashMap<i32, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChainLocks {
    fn for_show(&self, show_id: i32) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.entry(show_id).or_default().clone()
    }
}

pub struct SeaOrmRatingService {
    store: Store,
    chain_locks: ChainLocks,
}

impl SeaOrmRatingService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            chain_locks: ChainLocks::default(),
        }
    }

    /// Resolves the episode → season → show chain, or fails fast.
    async fn resolve_chain(&self, episode_id: EpisodeId) -> Result<Chain, RatingError> {
        let episode = self
            .store
            .get_episode(episode_id.value())
            .await?
            .ok_or(RatingError::UnknownEpisode(episode_id))?;

        let season = self.store.get_season(episode.season_id).await?.ok_or_else(|| {
            RatingError::ChainBroken {
                episode_id,
                detail: format!("season {} missing", episode.season_id),
            }
        })?;

        let show = self.store.get_show(season.show_id).await?.ok_or_else(|| {
            RatingError::ChainBroken {
                episode_id,
                detail: format!("show {} missing", season.show_id),
            }
        })?;

        Ok(Chain {
            episode_id: episode.id,
            season_id: season.id,
            show_id: show.id,
        })
    }

    /// Recomputes the three summaries on the chain, bottom-up.
    ///
    /// Runs after the rating row is committed, under the chain lock. Each
    /// write is independent; an error here leaves the levels above stale
    /// until the next write on the chain or a repair pass.
    async fn recompute_chain(&self, chain: &Chain) -> Result<(), RatingError> {
        let values = self.store.rating_values_for_episode(chain.episode_id).await?;
        if let Some(mean) = rollup::mean_of(&values) {
            self.store.set_episode_mean(chain.episode_id, mean).await?;
        } else {
            // Cannot happen on the write path: the rating just committed.
            warn!(episode_id = chain.episode_id, "No ratings found after write");
        }

        let episode_summaries = self
            .store
            .episode_summaries_for_season(chain.season_id)
            .await?;
        match rollup::rollup(&episode_summaries) {
            Some(summary) => self.store.set_season_summary(chain.season_id, summary).await?,
            None => self.store.set_season_rating_count(chain.season_id, 0).await?,
        }

        let season_summaries = self.store.season_summaries_for_show(chain.show_id).await?;
        match rollup::rollup(&season_summaries) {
            Some(summary) => self.store.set_show_summary(chain.show_id, summary).await?,
            None => self.store.set_show_rating_count(chain.show_id, 0).await?,
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl RatingService for SeaOrmRatingService {
    async fn record_rating(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        value: RatingValue,
    ) -> Result<RatingRecord, RatingError> {
        let chain = self.resolve_chain(episode_id).await?;

        let lock = self.chain_locks.for_show(chain.show_id);
        let _guard = lock.lock().await;

        // The raw rating and the episode count bump commit together; the
        // derived means follow outside the transaction.
        let txn = self.store.begin().await?;
        let (record, outcome) = self
            .store
            .upsert_rating_in(&txn, user_id.value(), episode_id.value(), value.value())
            .await?;
        if outcome.is_created() {
            self.store
                .increment_episode_rating_count_in(&txn, chain.episode_id)
                .await?;
        }
        txn.commit().await.map_err(|e| RatingError::Database(e.to_string()))?;

        debug!(
            user_id = user_id.value(),
            episode_id = episode_id.value(),
            value = value.value(),
            created = outcome.is_created(),
            "Rating stored"
        );

        self.recompute_chain(&chain).await?;

        Ok(record)
    }

    async fn get_rating(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
    ) -> Result<Option<RatingRecord>, RatingError> {
        Ok(self
            .store
            .get_rating(user_id.value(), episode_id.value())
            .await?)
    }

    async fn list_ratings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RatingRecord>, RatingError> {
        Ok(self.store.list_ratings_for_user(user_id.value()).await?)
    }

    async fn count_by_value_for_user(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<i32, i64>, RatingError> {
        Ok(self
            .store
            .count_ratings_by_value_for_user(user_id.value())
            .await?)
    }

    async fn rating_summary_for_user(
        &self,
        user_id: UserId,
    ) -> Result<UserRatingSummary, RatingError> {
        Ok(self.store.rating_summary_for_user(user_id.value()).await?)
    }

    async fn last_ratings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecentRating>, RatingError> {
        Ok(self
            .store
            .last_ratings_for_user(user_id.value(), RECENT_RATINGS_PROFILE_LIMIT)
            .await?)
    }

    async fn recent_ratings(&self) -> Result<Vec<RecentRating>, RatingError> {
        Ok(self.store.last_ratings(RECENT_RATINGS_SITE_LIMIT).await?)
    }

    async fn repair_summaries(&self) -> Result<RepairReport, RatingError> {
        let mut report = RepairReport::default();

        for episode_id in self.store.all_episode_ids().await? {
            let values = self.store.rating_values_for_episode(episode_id).await?;
            match rollup::mean_of(&values) {
                Some(mean) => {
                    let summary = Summary {
                        mean_rating: mean,
                        rating_count: i32::try_from(values.len()).unwrap_or(i32::MAX),
                    };
                    self.store.set_episode_summary(episode_id, summary).await?;
                }
                None => self.store.set_episode_rating_count(episode_id, 0).await?,
            }
            report.episodes += 1;
        }

        for season_id in self.store.all_season_ids().await? {
            let children = self.store.episode_summaries_for_season(season_id).await?;
            match rollup::rollup(&children) {
                Some(summary) => self.store.set_season_summary(season_id, summary).await?,
                None => self.store.set_season_rating_count(season_id, 0).await?,
            }
            report.seasons += 1;
        }

        for show_id in self.store.all_show_ids().await? {
            let children = self.store.season_summaries_for_show(show_id).await?;
            match rollup::rollup(&children) {
                Some(summary) => self.store.set_show_summary(show_id, summary).await?,
                None => self.store.set_show_rating_count(show_id, 0).await?,
            }
            report.shows += 1;
        }

        info!(
            episodes = report.episodes,
            seasons = report.seasons,
            shows = report.shows,
            "Summary repair complete"
        );

        Ok(report)
    }
}
