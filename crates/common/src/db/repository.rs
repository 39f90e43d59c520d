//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations. Every
//! post-scoped method takes the owning `blog_id` and filters on it;
//! tenant isolation in the consolidated schema rests entirely on that
//! parameterization.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};
use serde::{Deserialize, Serialize};

/// Row for the admin dashboard post listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStats {
    pub post_id: i64,
    pub title: String,
    pub slug: String,
    pub view_count: i64,
    pub like_count: i64,
    pub pending_comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Pending comment joined with its post title, for the moderation queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingComment {
    pub comment_id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub author_name: String,
    pub author_email: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Discovery sidebar row from the shared index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedPostCard {
    pub post_title: String,
    pub post_link: String,
    pub blog_subdomain: String,
}

/// Discovery sidebar row for the random blog sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogCard {
    pub subdomain: String,
    pub title: String,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user; duplicate email reports a conflict
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password_hash: String,
    ) -> Result<User> {
        let user = UserActiveModel {
            username: Set(username),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        user.insert(self.write_conn()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::EmailTaken { email }
            } else {
                e.into()
            }
        })
    }

    /// Find user by email (global, not tenant-scoped)
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Blog (Tenant) Operations
    // ========================================================================

    /// Create a blog record; duplicate subdomain or owner email conflicts
    pub async fn create_blog(
        &self,
        subdomain: String,
        title: String,
        owner_user_id: i64,
        owner_email: String,
    ) -> Result<Blog> {
        let blog = BlogActiveModel {
            subdomain: Set(subdomain.clone()),
            title: Set(title),
            owner_user_id: Set(owner_user_id),
            owner_email: Set(owner_email),
            subscription_status: Set("free".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        blog.insert(self.write_conn()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::SubdomainTaken { subdomain }
            } else {
                e.into()
            }
        })
    }

    /// Exact-match tenant lookup by subdomain label; runs on every request
    pub async fn find_blog_by_subdomain(&self, subdomain: &str) -> Result<Option<Blog>> {
        BlogEntity::find()
            .filter(BlogColumn::Subdomain.eq(subdomain))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find the blog owned by a user, if any
    pub async fn find_blog_by_owner(&self, owner_user_id: i64) -> Result<Option<Blog>> {
        BlogEntity::find()
            .filter(BlogColumn::OwnerUserId.eq(owner_user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Create a new post scoped to a blog
    pub async fn create_post(
        &self,
        blog_id: i64,
        user_id: i64,
        title: String,
        slug: String,
        content: String,
    ) -> Result<Post> {
        let now = Utc::now();

        let post = PostActiveModel {
            blog_id: Set(blog_id),
            user_id: Set(user_id),
            title: Set(title),
            slug: Set(slug),
            content: Set(content),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        post.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List a blog's posts, newest first
    pub async fn list_posts(&self, blog_id: i64) -> Result<Vec<Post>> {
        PostEntity::find()
            .filter(PostColumn::BlogId.eq(blog_id))
            .order_by_desc(PostColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a post by slug within a blog
    pub async fn find_post_by_slug(&self, blog_id: i64, slug: &str) -> Result<Option<Post>> {
        PostEntity::find()
            .filter(PostColumn::BlogId.eq(blog_id))
            .filter(PostColumn::Slug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a post by ID within a blog
    pub async fn find_post_by_id(&self, blog_id: i64, post_id: i64) -> Result<Option<Post>> {
        PostEntity::find()
            .filter(PostColumn::BlogId.eq(blog_id))
            .filter(PostColumn::Id.eq(post_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update a post's title, slug and content within a blog
    pub async fn update_post(
        &self,
        blog_id: i64,
        post_id: i64,
        title: String,
        slug: String,
        content: String,
    ) -> Result<Post> {
        let mut post: PostActiveModel = self
            .find_post_by_id(blog_id, post_id)
            .await?
            .ok_or(AppError::PostNotFound {
                slug_or_id: post_id.to_string(),
            })?
            .into();

        post.title = Set(title);
        post.slug = Set(slug);
        post.content = Set(content);
        post.updated_at = Set(Utc::now());

        post.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a post within a blog; comments, likes and tag links cascade
    pub async fn delete_post(&self, blog_id: i64, post_id: i64) -> Result<bool> {
        let result = PostEntity::delete_many()
            .filter(PostColumn::BlogId.eq(blog_id))
            .filter(PostColumn::Id.eq(post_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Bump the view counter without touching updated_at
    pub async fn increment_view_count(&self, post_id: i64) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            "UPDATE posts SET view_count = view_count + 1 WHERE id = ?",
            [post_id.into()],
        );

        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Posts with view/like/pending-comment stats for the admin dashboard
    pub async fn posts_with_stats(&self, blog_id: i64) -> Result<Vec<PostStats>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            r#"
            SELECT
                p.id,
                p.title,
                p.slug,
                p.view_count,
                (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                (SELECT COUNT(*) FROM comments c
                    WHERE c.post_id = p.id AND c.is_approved = FALSE) AS pending_comment_count,
                p.created_at
            FROM posts p
            WHERE p.blog_id = ?
            ORDER BY p.created_at DESC
            "#,
            [blog_id.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(PostStats {
                    post_id: row.try_get_by_index::<i64>(0).ok()?,
                    title: row.try_get_by_index::<String>(1).ok()?,
                    slug: row.try_get_by_index::<String>(2).ok()?,
                    view_count: row.try_get_by_index::<i64>(3).ok()?,
                    like_count: row.try_get_by_index::<i64>(4).ok()?,
                    pending_comment_count: row.try_get_by_index::<i64>(5).ok()?,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(6).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    // ========================================================================
    // Tag Operations
    // ========================================================================

    /// Insert-or-fetch a global tag by slug, returning its id
    pub async fn upsert_tag(&self, name: &str, slug: &str) -> Result<i64> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            "INSERT IGNORE INTO tags (name, slug) VALUES (?, ?)",
            [name.into(), slug.into()],
        );

        self.write_conn().execute(stmt).await?;

        let tag = TagEntity::find()
            .filter(TagColumn::Slug.eq(slug))
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::Internal {
                message: format!("Tag vanished after upsert: {}", slug),
            })?;

        Ok(tag.id)
    }

    /// Replace a post's tag links with the given set
    pub async fn set_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        PostTagEntity::delete_many()
            .filter(PostTagColumn::PostId.eq(post_id))
            .exec(self.write_conn())
            .await?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let links = tag_ids.iter().map(|&tag_id| PostTagActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        });

        // Composite primary key, so skip the last-insert-id read
        PostTagEntity::insert_many(links)
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(())
    }

    /// Tags attached to a post
    pub async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        let links = PostTagEntity::find()
            .filter(PostTagColumn::PostId.eq(post_id))
            .all(self.read_conn())
            .await?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<i64> = links.into_iter().map(|l| l.tag_id).collect();

        TagEntity::find()
            .filter(TagColumn::Id.is_in(tag_ids))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Comment Operations
    // ========================================================================

    /// Add a comment; always starts unapproved
    pub async fn add_comment(
        &self,
        post_id: i64,
        author_name: String,
        author_email: Option<String>,
        body: String,
    ) -> Result<Comment> {
        let comment = CommentActiveModel {
            post_id: Set(post_id),
            author_name: Set(author_name),
            author_email: Set(author_email),
            body: Set(body),
            is_approved: Set(false),
            approved_by_user_id: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        comment.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Publicly visible comments for a post, oldest first
    pub async fn approved_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        CommentEntity::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .filter(CommentColumn::IsApproved.eq(true))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Moderation queue: unapproved comments across a blog's posts
    pub async fn pending_comments(&self, blog_id: i64) -> Result<Vec<PendingComment>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            r#"
            SELECT
                c.id,
                c.post_id,
                p.title,
                c.author_name,
                c.author_email,
                c.body,
                c.created_at
            FROM comments c
            JOIN posts p ON c.post_id = p.id
            WHERE p.blog_id = ? AND c.is_approved = FALSE
            ORDER BY c.created_at ASC
            "#,
            [blog_id.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(PendingComment {
                    comment_id: row.try_get_by_index::<i64>(0).ok()?,
                    post_id: row.try_get_by_index::<i64>(1).ok()?,
                    post_title: row.try_get_by_index::<String>(2).ok()?,
                    author_name: row.try_get_by_index::<String>(3).ok()?,
                    author_email: row.try_get_by_index::<Option<String>>(4).ok()?,
                    body: row.try_get_by_index::<String>(5).ok()?,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(6).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Approve a comment, verifying it belongs to a post on the given blog
    pub async fn approve_comment(
        &self,
        blog_id: i64,
        comment_id: i64,
        approved_by_user_id: i64,
    ) -> Result<Comment> {
        let comment = CommentEntity::find_by_id(comment_id)
            .one(self.write_conn())
            .await?
            .ok_or(AppError::CommentNotFound { id: comment_id })?;

        // Scope check: the comment's post must live on this blog
        self.find_post_by_id(blog_id, comment.post_id)
            .await?
            .ok_or(AppError::CommentNotFound { id: comment_id })?;

        let mut comment: CommentActiveModel = comment.into();
        comment.is_approved = Set(true);
        comment.approved_by_user_id = Set(Some(approved_by_user_id));

        comment.update(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Like Operations
    // ========================================================================

    /// Record a like; a second like from the same identifier conflicts
    pub async fn add_like(&self, post_id: i64, liker_hash: &str) -> Result<()> {
        let like = LikeActiveModel {
            post_id: Set(post_id),
            liker_hash: Set(liker_hash.to_string()),
            ..Default::default()
        };

        like.insert(self.write_conn()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::AlreadyLiked
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    /// Number of likes on a post
    pub async fn like_count(&self, post_id: i64) -> Result<u64> {
        LikeEntity::find()
            .filter(LikeColumn::PostId.eq(post_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Shared Index Operations
    // ========================================================================

    /// Append a discovery row when a post is published
    pub async fn add_shared_post(
        &self,
        post_id: i64,
        blog_subdomain: String,
        post_title: String,
        post_link: String,
        post_created_at: DateTime<Utc>,
    ) -> Result<SharedPost> {
        let entry = SharedPostActiveModel {
            post_id: Set(post_id),
            blog_subdomain: Set(blog_subdomain),
            post_title: Set(post_title),
            post_link: Set(post_link),
            post_created_at: Set(post_created_at),
            ..Default::default()
        };

        entry.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Drop the discovery row when its post is deleted
    pub async fn remove_shared_post(&self, post_id: i64, blog_subdomain: &str) -> Result<()> {
        SharedPostEntity::delete_many()
            .filter(SharedPostColumn::PostId.eq(post_id))
            .filter(SharedPostColumn::BlogSubdomain.eq(blog_subdomain))
            .exec(self.write_conn())
            .await?;

        Ok(())
    }

    /// Recent cross-tenant posts in random order, capped
    pub async fn recent_shared_posts(
        &self,
        window_days: i64,
        limit: u64,
    ) -> Result<Vec<SharedPostCard>> {
        let cutoff = Utc::now() - Duration::days(window_days);

        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            r#"
            SELECT post_title, post_link, blog_subdomain
            FROM shared_posts_index
            WHERE post_created_at >= ?
            ORDER BY RAND()
            LIMIT ?
            "#,
            [cutoff.into(), limit.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(SharedPostCard {
                    post_title: row.try_get_by_index::<String>(0).ok()?,
                    post_link: row.try_get_by_index::<String>(1).ok()?,
                    blog_subdomain: row.try_get_by_index::<String>(2).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Random sample of blogs for discovery, capped
    pub async fn random_blogs(&self, limit: u64) -> Result<Vec<BlogCard>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            r#"
            SELECT subdomain, title
            FROM blogs
            ORDER BY RAND()
            LIMIT ?
            "#,
            [limit.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(BlogCard {
                    subdomain: row.try_get_by_index::<String>(0).ok()?,
                    title: row.try_get_by_index::<String>(1).ok()?,
                })
            })
            .collect();

        Ok(results)
    }
}
