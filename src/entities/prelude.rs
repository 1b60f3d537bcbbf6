pub use super::episodes::Entity as Episodes;
pub use super::ratings::Entity as Ratings;
pub use super::seasons::Entity as Seasons;
pub use super::show_tags::Entity as ShowTags;
pub use super::shows::Entity as Shows;
