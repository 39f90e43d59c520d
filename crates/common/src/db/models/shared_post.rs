//! Shared post index entity
//!
//! Denormalized cross-tenant rows backing the discovery sidebar. Written
//! when a post is created, removed when it is deleted; never the
//! authoritative copy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shared_posts_index")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Id of the post on its home blog
    pub post_id: i64,

    pub blog_subdomain: String,

    pub post_title: String,

    pub post_link: String,

    pub post_created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
