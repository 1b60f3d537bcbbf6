//! End-to-end tests of the rating write path: one rating in, three
//! summaries recomputed up the chain.

use rankarr::db::Store;
use rankarr::domain::{EpisodeId, RatingValue, UserId};
use rankarr::models::catalog::{EpisodeInput, SeasonInput, ShowInput};
use rankarr::services::{
    RatingError, RatingService, SeaOrmRatingService, SeaOrmWatchTimeService, WatchTimeService,
};

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("rankarr-rollup-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test store")
}

/// Seeds a show with the given episode counts per season, returning
/// (show id, per-season episode ids).
async fn seed_show(
    store: &Store,
    slug: &str,
    minutes: i32,
    episodes_per_season: &[i32],
) -> (i32, Vec<Vec<i32>>) {
    let show = store
        .add_show(&ShowInput {
            name: format!("Show {slug}"),
            slug: slug.to_string(),
            episode_minutes: minutes,
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

async fn rate(service: &SeaOrmRatingService, user: i32, episode: i32, value: i32) {
    service
        .record_rating(
            UserId::new(user),
            EpisodeId::new(episode),
            RatingValue::new(value),
        )
        .await
        .expect("failed to record rating");
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn first_rating_propagates_to_show() {
    let store = test_store().await;
    let (show_id, seasons) = seed_show(&store, "first", 24, &[2]).await;
    let service = SeaOrmRatingService::new(store.clone());

    rate(&service, 1, seasons[0][0], 16).await;

    let episode = store.get_episode(seasons[0][0]).await.unwrap().unwrap();
    assert_close(episode.mean_rating, 16.0);
    assert_eq!(episode.rating_count, 1);

    let season = store.get_season(episode.season_id).await.unwrap().unwrap();
    assert_close(season.mean_rating, 16.0);
    assert_eq!(season.rating_count, 1);

    let show = store.get_show(show_id).await.unwrap().unwrap();
    assert_close(show.mean_rating, 16.0);
    assert_eq!(show.rating_count, 1);

    let untouched = store.get_episode(seasons[0][1]).await.unwrap().unwrap();
    assert_eq!(untouched.rating_count, 0);
}

#[tokio::test]
async fn re_rating_overwrites_without_bumping_counts() {
    let store = test_store().await;
    let (show_id, seasons) = seed_show(&store, "rerate", 24, &[1]).await;
    let service = SeaOrmRatingService::new(store.clone());

    rate(&service, 1, seasons[0][0], 10).await;
    rate(&service, 1, seasons[0][0], 20).await;

    let episode = store.get_episode(seasons[0][0]).await.unwrap().unwrap();
    assert_close(episode.mean_rating, 20.0);
    assert_eq!(episode.rating_count, 1);

    let show = store.get_show(show_id).await.unwrap().unwrap();
    assert_close(show.mean_rating, 20.0);
    assert_eq!(show.rating_count, 1);

    let stored = service
        .get_rating(UserId::new(1), EpisodeId::new(seasons[0][0]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.value, 20);
}

#[tokio::test]
async fn season_mean_averages_episode_means_not_raw_values() {
    let store = test_store().await;
    let (_, seasons) = seed_show(&store, "weights", 24, &[2]).await;
    let service = SeaOrmRatingService::new(store.clone());

    // Episode 1: two ratings, mean 15. Episode 2: one rating, mean 20.
    rate(&service, 1, seasons[0][0], 10).await;
    rate(&service, 2, seasons[0][0], 20).await;
    rate(&service, 1, seasons[0][1], 20).await;

    // An average over raw values would give 50/3; episode means weigh
    // each episode equally.
    let first = store.get_episode(seasons[0][0]).await.unwrap().unwrap();
    let season = store.get_season(first.season_id).await.unwrap().unwrap();
    assert_close(season.mean_rating, 17.5);
    assert_eq!(season.rating_count, 2);
}

#[tokio::test]
async fn unrated_children_are_excluded_from_rollups() {
    let store = test_store().await;
    let (show_id, seasons) = seed_show(&store, "sparse", 24, &[2, 3]).await;
    let service = SeaOrmRatingService::new(store.clone());

    // Only one episode of season 1 rated; season 2 untouched.
    rate(&service, 1, seasons[0][0], 14).await;

    let show = store.get_show(show_id).await.unwrap().unwrap();
    assert_close(show.mean_rating, 14.0);
    assert_eq!(show.rating_count, 1);

    let second_season_episode = store.get_episode(seasons[1][0]).await.unwrap().unwrap();
    let second_season = store
        .get_season(second_season_episode.season_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second_season.rating_count, 0);
}

#[tokio::test]
async fn unknown_episode_is_rejected() {
    let store = test_store().await;
    seed_show(&store, "reject", 24, &[1]).await;
    let service = SeaOrmRatingService::new(store.clone());

    let result = service
        .record_rating(UserId::new(1), EpisodeId::new(99_999), RatingValue::new(10))
        .await;

    assert!(matches!(result, Err(RatingError::UnknownEpisode(_))));
}

#[tokio::test]
async fn user_reads_cover_histogram_summary_and_recent() {
    let store = test_store().await;
    let (_, seasons) = seed_show(&store, "profile", 24, &[3]).await;
    let service = SeaOrmRatingService::new(store.clone());

    rate(&service, 7, seasons[0][0], 10).await;
    rate(&service, 7, seasons[0][1], 10).await;
    rate(&service, 7, seasons[0][2], 20).await;
    rate(&service, 8, seasons[0][0], 5).await;

    let histogram = service.count_by_value_for_user(UserId::new(7)).await.unwrap();
    assert_eq!(histogram.get(&10), Some(&2));
    assert_eq!(histogram.get(&20), Some(&1));
    assert_eq!(histogram.get(&5), None);

    let summary = service.rating_summary_for_user(UserId::new(7)).await.unwrap();
    assert_close(summary.avg_rating, 40.0 / 3.0);
    assert_eq!(summary.rating_count, 3);

    let all = service.list_ratings_for_user(UserId::new(7)).await.unwrap();
    assert_eq!(all.len(), 3);

    let recent = service.last_ratings_for_user(UserId::new(7)).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].episode_id, seasons[0][2]);
    assert_eq!(recent[0].season_number, 1);
    assert!(recent[0].show_name.contains("profile"));

    let feed = service.recent_ratings().await.unwrap();
    assert_eq!(feed.len(), 4);
    assert_eq!(feed[0].user_id, 8);
}

#[tokio::test]
async fn empty_user_summary_is_zeroes() {
    let store = test_store().await;
    let service = SeaOrmRatingService::new(store.clone());

    let summary = service.rating_summary_for_user(UserId::new(42)).await.unwrap();
    assert_close(summary.avg_rating, 0.0);
    assert_eq!(summary.rating_count, 0);
    assert!(service.count_by_value_for_user(UserId::new(42)).await.unwrap().is_empty());
}

#[tokio::test]
async fn watch_time_sums_show_minutes_over_rated_episodes() {
    let store = test_store().await;
    let (_, long) = seed_show(&store, "long", 42, &[2]).await;
    let (_, short) = seed_show(&store, "short", 20, &[1]).await;
    let ratings = SeaOrmRatingService::new(store.clone());
    let watch = SeaOrmWatchTimeService::new(store.clone());

    rate(&ratings, 3, long[0][0], 12).await;
    rate(&ratings, 3, long[0][1], 2).await;
    rate(&ratings, 3, short[0][0], 18).await;

    // The rating value never matters, only that the episode was rated.
    let minutes = watch.watch_minutes(UserId::new(3)).await.unwrap();
    assert_eq!(minutes, 42 + 42 + 20);

    let nobody = watch.watch_minutes(UserId::new(99)).await.unwrap();
    assert_eq!(nobody, 0);
}

#[tokio::test]
async fn repair_rebuilds_corrupted_summaries() {
    let store = test_store().await;
    let (show_id, seasons) = seed_show(&store, "repair", 24, &[2]).await;
    let service = SeaOrmRatingService::new(store.clone());

    rate(&service, 1, seasons[0][0], 12).await;
    rate(&service, 2, seasons[0][0], 18).await;

    // Corrupt every level.
    store
        .set_show_summary(
            show_id,
            rankarr::rollup::Summary {
                mean_rating: 1.0,
                rating_count: 99,
            },
        )
        .await
        .unwrap();
    store.set_episode_rating_count(seasons[0][0], 7).await.unwrap();

    let report = service.repair_summaries().await.unwrap();
    assert_eq!(report.episodes, 2);
    assert_eq!(report.seasons, 1);
    assert_eq!(report.shows, 1);

    let episode = store.get_episode(seasons[0][0]).await.unwrap().unwrap();
    assert_close(episode.mean_rating, 15.0);
    assert_eq!(episode.rating_count, 2);

    let show = store.get_show(show_id).await.unwrap().unwrap();
    assert_close(show.mean_rating, 15.0);
    assert_eq!(show.rating_count, 1);
}
