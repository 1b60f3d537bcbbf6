//! `SeaORM`-backed implementation of the ranking service.

use crate::cache::RankingCache;
use crate::config::RankingConfig;
use crate::constants::{MAX_RANKING_LIMIT, RANKING_CACHE_DEPTH};
use crate::db::Store;
use crate::domain::{SortOrder, UnitKind};
use crate::models::ranking::{RankingEntry, RankingKey, RankingScope};
use crate::services::ranking_service::{RankingError, RankingService};
use std::sync::Arc;
use tracing::debug;

pub struct SeaOrmRankingService {
    store: Store,
    cache: Arc<dyn RankingCache>,
    config: RankingConfig,
}

impl SeaOrmRankingService {
    #[must_use]
    pub fn new(store: Store, cache: Arc<dyn RankingCache>, config: RankingConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    const fn threshold_for(&self, kind: UnitKind) -> i32 {
        match kind {
            UnitKind::Show => self.config.min_count_shows,
            UnitKind::Season => self.config.min_count_seasons,
            UnitKind::Episode => self.config.min_count_episodes,
        }
    }

    async fn compute_public(
        &self,
        scope: &RankingScope,
        order: SortOrder,
    ) -> Result<Vec<RankingEntry>, RankingError> {
        let min_count = self.threshold_for(scope.unit_kind());
        let depth = RANKING_CACHE_DEPTH;

        let rows = match scope {
            RankingScope::Shows => self.store.ranking_shows(min_count, order, depth).await?,
            RankingScope::ShowsByTag { kind, name } => {
                self.store
                    .ranking_shows_by_tag(*kind, name, min_count, order, depth)
                    .await?
            }
            RankingScope::Seasons => self.store.ranking_seasons(min_count, order, depth).await?,
            RankingScope::Episodes => self.store.ranking_episodes(min_count, order, depth).await?,
            RankingScope::Pilots => self.store.ranking_pilots(min_count, order, depth).await?,
            _ => unreachable!("user scopes never reach the public path"),
        };

        Ok(rows)
    }

    async fn compute_user(
        &self,
        scope: &RankingScope,
        order: SortOrder,
        limit: u64,
    ) -> Result<Vec<RankingEntry>, RankingError> {
        let rows = match scope {
            RankingScope::UserShows(user) => {
                self.store
                    .ranking_user_shows(user.value(), order, limit)
                    .await?
            }
            RankingScope::UserSeasons(user) => {
                self.store
                    .ranking_user_seasons(user.value(), order, limit)
                    .await?
            }
            RankingScope::UserEpisodes(user) => {
                self.store
                    .ranking_user_episodes(user.value(), order, limit)
                    .await?
            }
            RankingScope::UserPilots(user) => {
                self.store
                    .ranking_user_pilots(user.value(), order, limit)
                    .await?
            }
            _ => unreachable!("public scopes never reach the user path"),
        };

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl RankingService for SeaOrmRankingService {
    async fn get_ranking(
        &self,
        scope: RankingScope,
        order: SortOrder,
        limit: Option<u64>,
    ) -> Result<Vec<RankingEntry>, RankingError> {
        let limit = limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, MAX_RANKING_LIMIT);

        if scope.is_user_scoped() {
            return self.compute_user(&scope, order, limit).await;
        }

        let key = RankingKey {
            scope: scope.clone(),
            order,
        };

        let mut rows = match self.cache.get(&key) {
            Some(rows) => {
                debug!(scope = %scope, "Ranking served from cache");
                rows
            }
            None => {
                let rows = self.compute_public(&scope, order).await?;
                debug!(scope = %scope, rows = rows.len(), "Ranking computed");
                self.cache.put(key, rows.clone());
                rows
            }
        };

        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}
