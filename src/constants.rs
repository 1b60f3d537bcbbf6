/// Default number of rows a ranking query returns.
pub const DEFAULT_RANKING_LIMIT: u64 = 10;

/// Hard cap on requested ranking limits.
pub const MAX_RANKING_LIMIT: u64 = 50;

/// Rows computed per cached public scope. The cache key ignores the request
/// limit, so one computation at this depth serves every limit up to the cap.
pub const RANKING_CACHE_DEPTH: u64 = 100;

/// Recent ratings shown on a user profile.
pub const RECENT_RATINGS_PROFILE_LIMIT: u64 = 15;

/// Recent ratings shown in the site-wide activity feed.
pub const RECENT_RATINGS_SITE_LIMIT: u64 = 20;
