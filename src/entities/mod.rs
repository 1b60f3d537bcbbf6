pub mod prelude;

pub mod episodes;
pub mod ratings;
pub mod seasons;
pub mod show_tags;
pub mod shows;
