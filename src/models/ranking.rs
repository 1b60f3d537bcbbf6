use crate::domain::{SortOrder, UnitKind, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag dimension a show ranking can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Genre,
    Channel,
    Nationality,
}

impl TagKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Channel => "channel",
            Self::Nationality => "nationality",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a ranking query ranks, and over which slice of the data.
///
/// Public scopes are served from denormalized summaries, filtered by the
/// per-kind eligibility threshold and cached with a TTL. User scopes
/// aggregate that user's raw ratings, apply no threshold and are always
/// computed fresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RankingScope {
    Shows,
    ShowsByTag { kind: TagKind, name: String },
    Seasons,
    Episodes,
    /// Season 1 episode 1 across all shows.
    Pilots,
    UserShows(UserId),
    UserSeasons(UserId),
    UserEpisodes(UserId),
    UserPilots(UserId),
}

impl RankingScope {
    /// User scopes must reflect the user's most recent rating immediately,
    /// so they bypass the cache.
    #[must_use]
    pub const fn is_user_scoped(&self) -> bool {
        matches!(
            self,
            Self::UserShows(_) | Self::UserSeasons(_) | Self::UserEpisodes(_) | Self::UserPilots(_)
        )
    }

    /// The entity kind whose eligibility threshold applies. Pilots are
    /// episodes, so they share the episode threshold.
    #[must_use]
    pub const fn unit_kind(&self) -> UnitKind {
        match self {
            Self::Shows | Self::ShowsByTag { .. } | Self::UserShows(_) => UnitKind::Show,
            Self::Seasons | Self::UserSeasons(_) => UnitKind::Season,
            Self::Episodes | Self::Pilots | Self::UserEpisodes(_) | Self::UserPilots(_) => {
                UnitKind::Episode
            }
        }
    }
}

impl fmt::Display for RankingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shows => write!(f, "shows"),
            Self::ShowsByTag { kind, name } => write!(f, "shows[{kind}={name}]"),
            Self::Seasons => write!(f, "seasons"),
            Self::Episodes => write!(f, "episodes"),
            Self::Pilots => write!(f, "pilots"),
            Self::UserShows(u) => write!(f, "user:{u}:shows"),
            Self::UserSeasons(u) => write!(f, "user:{u}:seasons"),
            Self::UserEpisodes(u) => write!(f, "user:{u}:episodes"),
            Self::UserPilots(u) => write!(f, "user:{u}:pilots"),
        }
    }
}

/// Cache key for a ranking query: scope plus ordering direction.
///
/// The result limit is applied after cache retrieval, so two requests that
/// differ only in limit share one cached computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankingKey {
    pub scope: RankingScope,
    pub order: SortOrder,
}

/// One row of a leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub kind: UnitKind,
    pub id: i32,
    pub name: String,
    /// Owning show name for season/episode rankings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i32>,
    pub mean_rating: f64,
    pub rating_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_scopes_bypass_cache() {
        assert!(RankingScope::UserShows(UserId::new(1)).is_user_scoped());
        assert!(RankingScope::UserPilots(UserId::new(1)).is_user_scoped());
        assert!(!RankingScope::Shows.is_user_scoped());
        assert!(!RankingScope::Pilots.is_user_scoped());
    }

    #[test]
    fn pilots_use_episode_threshold() {
        assert_eq!(RankingScope::Pilots.unit_kind(), UnitKind::Episode);
    }

    #[test]
    fn keys_distinguish_scope_parameters() {
        let by_genre = RankingKey {
            scope: RankingScope::ShowsByTag {
                kind: TagKind::Genre,
                name: "drama".to_string(),
            },
            order: SortOrder::Descending,
        };
        let by_channel = RankingKey {
            scope: RankingScope::ShowsByTag {
                kind: TagKind::Channel,
                name: "drama".to_string(),
            },
            order: SortOrder::Descending,
        };
        assert_ne!(by_genre, by_channel);
    }
}
