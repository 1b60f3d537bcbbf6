use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    /// Fixed minutes per episode for this show; watch time is derived from it.
    pub episode_minutes: i32,
    /// Denormalized summary: mean of rated child seasons' means.
    pub mean_rating: f64,
    /// Denormalized summary: number of child seasons with at least one rating.
    pub rating_count: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seasons::Entity")]
    Seasons,
    #[sea_orm(has_many = "super::show_tags::Entity")]
    ShowTags,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seasons.def()
    }
}

impl Related<super::show_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
