pub mod ranking_service;
pub mod ranking_service_impl;
pub mod rating_service;
pub mod rating_service_impl;
pub mod watch_time;

pub use ranking_service::{RankingError, RankingService};
pub use ranking_service_impl::SeaOrmRankingService;
pub use rating_service::{RatingError, RatingService, RepairReport};
pub use rating_service_impl::SeaOrmRatingService;
pub use watch_time::{SeaOrmWatchTimeService, WatchTimeError, WatchTimeService};
