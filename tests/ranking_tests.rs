//! Leaderboard tests: ordering, eligibility thresholds, tag and pilot
//! scopes, cache staleness and the always-fresh user scopes.

use rankarr::cache::{MemoryRankingCache, NoopRankingCache};
use rankarr::config::RankingConfig;
use rankarr::db::Store;
use rankarr::domain::{EpisodeId, RatingValue, SortOrder, UnitKind, UserId};
use rankarr::models::catalog::{EpisodeInput, SeasonInput, ShowInput};
use rankarr::models::ranking::{RankingScope, TagKind};
use rankarr::services::{
    RankingService, RatingService, SeaOrmRankingService, SeaOrmRatingService,
};
use std::sync::Arc;
use std::time::Duration;

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("rankarr-ranking-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test store")
}

fn permissive_config() -> RankingConfig {
    RankingConfig {
        min_count_shows: 0,
        min_count_seasons: 0,
        min_count_episodes: 0,
        cache_ttl_secs: 3600,
        default_limit: 10,
    }
}

fn fresh_ranking_service(store: &Store, config: RankingConfig) -> SeaOrmRankingService {
    SeaOrmRankingService::new(store.clone(), Arc::new(NoopRankingCache), config)
}

async fn seed_show(
    store: &Store,
    slug: &str,
    episodes_per_season: &[i32],
) -> (i32, Vec<Vec<i32>>) {
    let show = store
        .add_show(&ShowInput {
            name: format!("Show {slug}"),
            slug: slug.to_string(),
            episode_minutes: 24,
        })
        .await
        .expect("failed to insert show");

    let mut seasons = Vec::new();
    for (season_idx, episode_count) in episodes_per_season.iter().enumerate() {
        let season = store
            .add_season(&SeasonInput {
                show_id: show.id,
                number: i32::try_from(season_idx).unwrap() + 1,
            })
            .await
            .expect("failed to insert season");

        let mut episode_ids = Vec::new();
        for number in 1..=*episode_count {
            let episode = store
                .add_episode(&EpisodeInput {
                    season_id: season.id,
                    number,
                    title: format!("{slug} S{}E{}", season_idx + 1, number),
                })
                .await
                .expect("failed to insert episode");
            episode_ids.push(episode.id);
        }
        seasons.push(episode_ids);
    }

    (show.id, seasons)
}

async fn rate(store: &Store, user: i32, episode: i32, value: i32) {
    SeaOrmRatingService::new(store.clone())
        .record_rating(
            UserId::new(user),
            EpisodeId::new(episode),
            RatingValue::new(value),
        )
        .await
        .expect("failed to record rating");
}

#[tokio::test]
async fn show_ranking_orders_by_mean_in_both_directions() {
    let store = test_store().await;
    let (good_id, good) = seed_show(&store, "good", &[1]).await;
    let (bad_id, bad) = seed_show(&store, "bad", &[1]).await;

    rate(&store, 1, good[0][0], 18).await;
    rate(&store, 1, bad[0][0], 12).await;

    let service = fresh_ranking_service(&store, permissive_config());

    let best = service
        .get_ranking(RankingScope::Shows, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(best.len(), 2);
    assert_eq!(best[0].id, good_id);
    assert_eq!(best[0].kind, UnitKind::Show);
    assert_eq!(best[1].id, bad_id);

    let worst = service
        .get_ranking(RankingScope::Shows, SortOrder::Ascending, None)
        .await
        .unwrap();
    assert_eq!(worst[0].id, bad_id);
}

#[tokio::test]
async fn eligibility_threshold_is_strictly_greater_than() {
    let store = test_store().await;
    // "deep" gets two rated seasons (count 2), "shallow" one (count 1).
    let (deep_id, deep) = seed_show(&store, "deep", &[1, 1]).await;
    let (_, shallow) = seed_show(&store, "shallow", &[1, 1]).await;

    rate(&store, 1, deep[0][0], 15).await;
    rate(&store, 1, deep[1][0], 15).await;
    rate(&store, 1, shallow[0][0], 19).await;

    let mut config = permissive_config();
    config.min_count_shows = 1;
    let service = fresh_ranking_service(&store, config);

    let entries = service
        .get_ranking(RankingScope::Shows, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, deep_id);
}

#[tokio::test]
async fn ties_break_on_count_following_the_direction() {
    let store = test_store().await;
    // Same mean, different counts.
    let (_, popular) = seed_show(&store, "popular", &[2]).await;
    let (_, niche) = seed_show(&store, "niche", &[1]).await;

    rate(&store, 1, popular[0][0], 15).await;
    rate(&store, 1, popular[0][1], 15).await;
    rate(&store, 1, niche[0][0], 15).await;

    let service = fresh_ranking_service(&store, permissive_config());

    let popular_season = store
        .get_episode(popular[0][0])
        .await
        .unwrap()
        .unwrap()
        .season_id;
    let niche_season = store
        .get_episode(niche[0][0])
        .await
        .unwrap()
        .unwrap()
        .season_id;

    let descending = service
        .get_ranking(RankingScope::Seasons, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(descending[0].id, popular_season);
    assert!(descending[0].rating_count > descending[1].rating_count);

    let ascending = service
        .get_ranking(RankingScope::Seasons, SortOrder::Ascending, None)
        .await
        .unwrap();
    assert_eq!(ascending[0].id, niche_season);
    assert!(ascending[0].rating_count < ascending[1].rating_count);
}

#[tokio::test]
async fn pilot_ranking_only_contains_first_episodes_of_first_seasons() {
    let store = test_store().await;
    let (_, seasons) = seed_show(&store, "pilot", &[2, 1]).await;

    rate(&store, 1, seasons[0][0], 16).await; // S1E1, the pilot
    rate(&store, 1, seasons[0][1], 18).await; // S1E2
    rate(&store, 1, seasons[1][0], 20).await; // S2E1

    let service = fresh_ranking_service(&store, permissive_config());

    let pilots = service
        .get_ranking(RankingScope::Pilots, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(pilots.len(), 1);
    assert_eq!(pilots[0].id, seasons[0][0]);
    assert_eq!(pilots[0].kind, UnitKind::Episode);
    assert_eq!(pilots[0].season_number, Some(1));
    assert_eq!(pilots[0].episode_number, Some(1));

    let episodes = service
        .get_ranking(RankingScope::Episodes, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(episodes.len(), 3);
}

#[tokio::test]
async fn tag_scope_restricts_the_show_ranking() {
    let store = test_store().await;
    let (drama_id, drama) = seed_show(&store, "drama-show", &[1]).await;
    let (_, comedy) = seed_show(&store, "comedy-show", &[1]).await;

    store
        .add_show_tag(drama_id, TagKind::Genre, "drama")
        .await
        .unwrap();

    rate(&store, 1, drama[0][0], 14).await;
    rate(&store, 1, comedy[0][0], 16).await;

    let service = fresh_ranking_service(&store, permissive_config());

    let entries = service
        .get_ranking(
            RankingScope::ShowsByTag {
                kind: TagKind::Genre,
                name: "drama".to_string(),
            },
            SortOrder::Descending,
            None,
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, drama_id);

    // Same name under another kind matches nothing.
    let entries = service
        .get_ranking(
            RankingScope::ShowsByTag {
                kind: TagKind::Channel,
                name: "drama".to_string(),
            },
            SortOrder::Descending,
            None,
        )
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn user_ranking_aggregates_that_users_raw_ratings() {
    let store = test_store().await;
    let (show_id, seasons) = seed_show(&store, "personal", &[2]).await;

    rate(&store, 1, seasons[0][0], 10).await;
    rate(&store, 1, seasons[0][1], 20).await;
    // Another user's ratings must not leak into user 1's view.
    rate(&store, 2, seasons[0][0], 0).await;

    // Thresholds never apply to user scopes.
    let mut config = permissive_config();
    config.min_count_shows = 50;
    let service = fresh_ranking_service(&store, config);

    let entries = service
        .get_ranking(
            RankingScope::UserShows(UserId::new(1)),
            SortOrder::Descending,
            None,
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, show_id);
    assert!((entries[0].mean_rating - 15.0).abs() < 1e-9);
    assert_eq!(entries[0].rating_count, 2);
}

#[tokio::test]
async fn cached_public_ranking_is_stale_but_user_scope_is_fresh() {
    let store = test_store().await;
    let (_, seasons) = seed_show(&store, "stale", &[2]).await;

    rate(&store, 1, seasons[0][0], 10).await;

    let cache = Arc::new(MemoryRankingCache::new(Duration::from_secs(3600)));
    let service = SeaOrmRankingService::new(store.clone(), cache, permissive_config());

    let before = service
        .get_ranking(RankingScope::Episodes, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    rate(&store, 1, seasons[0][1], 20).await;

    // Public scope still serves the cached computation.
    let after = service
        .get_ranking(RankingScope::Episodes, SortOrder::Descending, None)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);

    // The user scope sees the new rating immediately.
    let user = service
        .get_ranking(
            RankingScope::UserEpisodes(UserId::new(1)),
            SortOrder::Descending,
            None,
        )
        .await
        .unwrap();
    assert_eq!(user.len(), 2);
}

#[tokio::test]
async fn one_cached_computation_serves_every_limit() {
    let store = test_store().await;
    let (_, seasons) = seed_show(&store, "limits", &[3]).await;

    rate(&store, 1, seasons[0][0], 10).await;
    rate(&store, 1, seasons[0][1], 15).await;
    rate(&store, 1, seasons[0][2], 20).await;

    let cache = Arc::new(MemoryRankingCache::new(Duration::from_secs(3600)));
    let service = SeaOrmRankingService::new(store.clone(), cache, permissive_config());

    let narrow = service
        .get_ranking(RankingScope::Episodes, SortOrder::Descending, Some(1))
        .await
        .unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0].id, seasons[0][2]);

    // A wider request after the narrow one still gets the full result: the
    // cache stores the deep computation, not the truncated response.
    let wide = service
        .get_ranking(RankingScope::Episodes, SortOrder::Descending, Some(3))
        .await
        .unwrap();
    assert_eq!(wide.len(), 3);
}
