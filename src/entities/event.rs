use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_image::Entity")]
    EventImage,
    #[sea_orm(has_one = "super::event_video::Entity")]
    EventVideo,
}

impl Related<super::event_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventImage.def()
    }
}

impl Related<super::event_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventVideo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
