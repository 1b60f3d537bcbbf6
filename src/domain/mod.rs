//! Domain types for the rating subsystem with strong typing.
//!
//! Newtype wrappers prevent mixing the four ID spaces (users, shows, seasons,
//! episodes) that all travel as `i32` at the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new ID from a raw i32 value.
            ///
            /// # Panics
            ///
            /// Panics in debug mode if `id` is negative. Production code should
            /// validate before construction.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

id_newtype! {
    /// Identifier of a rating user. Users live in an external system; this is
    /// an opaque foreign key.
    UserId
}

id_newtype! {
    /// Identifier of a show, the root of the containment hierarchy.
    ShowId
}

id_newtype! {
    /// Identifier of a season within a show.
    SeasonId
}

id_newtype! {
    /// Identifier of an episode within a season, the unit users rate.
    EpisodeId
}

/// A rating value on the site's 0..=20 scale.
///
/// Range validation happens at the API edge (the caller's responsibility);
/// the wrapper only carries the already-admitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingValue(i32);

impl RatingValue {
    /// Upper bound of the admissible range when no configuration overrides it.
    pub const DEFAULT_MAX: i32 = 20;

    #[must_use]
    pub const fn new(value: i32) -> Self {
        debug_assert!(value >= 0, "RatingValue should be non-negative");
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Checks a raw value against an inclusive upper bound.
    #[must_use]
    pub const fn in_range(value: i32, max: i32) -> bool {
        value >= 0 && value <= max
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RatingValue> for i32 {
    fn from(v: RatingValue) -> Self {
        v.0
    }
}

impl From<i32> for RatingValue {
    fn from(v: i32) -> Self {
        Self::new(v)
    }
}

/// Sort order for ranking queries, replacing boolean blindness.
///
/// The tie-break on `rating_count` follows the same direction as the primary
/// order on `mean_rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// The three entity kinds carrying a denormalized rating summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Show,
    Season,
    Episode,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "show"),
            Self::Season => write!(f, "season"),
            Self::Episode => write!(f, "episode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_conversions() {
        let id = EpisodeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(EpisodeId::from(42), id);
    }

    #[test]
    fn id_equality() {
        assert_eq!(ShowId::new(1), ShowId::new(1));
        assert_ne!(ShowId::new(1), ShowId::new(2));
    }

    #[test]
    fn rating_value_range_check() {
        assert!(RatingValue::in_range(0, 20));
        assert!(RatingValue::in_range(20, 20));
        assert!(!RatingValue::in_range(21, 20));
        assert!(!RatingValue::in_range(-1, 20));
    }

    #[test]
    fn sort_order_default_is_descending() {
        assert!(!SortOrder::default().is_ascending());
        assert!(SortOrder::Ascending.is_ascending());
    }

    #[test]
    fn id_serialization() {
        let id = UserId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
