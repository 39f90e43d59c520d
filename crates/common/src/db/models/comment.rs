//! Comment entity
//!
//! New comments start unapproved and stay invisible to the public
//! comment query until a moderator flips the flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub post_id: i64,

    pub author_name: String,

    #[sea_orm(nullable)]
    pub author_email: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub is_approved: bool,

    #[sea_orm(nullable)]
    pub approved_by_user_id: Option<i64>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
