//! SeaORM entity models
//!
//! Database entities for the consolidated Inkwell schema

mod blog;
mod comment;
mod like;
mod post;
mod post_tag;
mod shared_post;
mod tag;
mod user;

pub use blog::{
    ActiveModel as BlogActiveModel,
    Column as BlogColumn,
    Entity as BlogEntity,
    Model as Blog,
};

pub use user::{
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Entity as UserEntity,
    Model as User,
};

pub use post::{
    ActiveModel as PostActiveModel,
    Column as PostColumn,
    Entity as PostEntity,
    Model as Post,
};

pub use tag::{
    ActiveModel as TagActiveModel,
    Column as TagColumn,
    Entity as TagEntity,
    Model as Tag,
};

pub use post_tag::{
    ActiveModel as PostTagActiveModel,
    Column as PostTagColumn,
    Entity as PostTagEntity,
    Model as PostTag,
};

pub use comment::{
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
    Entity as CommentEntity,
    Model as Comment,
};

pub use like::{
    ActiveModel as LikeActiveModel,
    Column as LikeColumn,
    Entity as LikeEntity,
    Model as Like,
};

pub use shared_post::{
    ActiveModel as SharedPostActiveModel,
    Column as SharedPostColumn,
    Entity as SharedPostEntity,
    Model as SharedPost,
};
