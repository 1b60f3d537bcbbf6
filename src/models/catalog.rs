/// Input for registering a show. Catalog management proper lives outside
/// this subsystem; these inputs exist for seeding and for the admin import
/// path that feeds the hierarchy.
#[derive(Debug, Clone)]
pub struct ShowInput {
    pub name: String,
    pub slug: String,
    pub episode_minutes: i32,
}

#[derive(Debug, Clone)]
pub struct SeasonInput {
    pub show_id: i32,
    pub number: i32,
}

#[derive(Debug, Clone)]
pub struct EpisodeInput {
    pub season_id: i32,
    pub number: i32,
    pub title: String,
}

/// The episode → season → show ancestry path touched by one rating write.
#[derive(Debug, Clone, Copy)]
pub struct Chain {
    pub episode_id: i32,
    pub season_id: i32,
    pub show_id: i32,
}
