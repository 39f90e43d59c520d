//! Blog-owner admin handlers: dashboard, post management, moderation
//!
//! Every route here requires tenant scope and the authenticated user to
//! be the blog's owner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::CurrentUser;
use crate::tenant::{BlogScope, TenantContext};
use crate::AppState;
use inkwell_common::{
    auth::Identity,
    db::{PendingComment, PostStats, Repository},
    errors::{AppError, Result},
    metrics,
    slug::slugify,
};

fn require_owner(scope: &BlogScope, user: &Identity) -> Result<()> {
    if scope.owner_user_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::NotBlogOwner)
    }
}

/// Dashboard payload: post stats plus the moderation queue
#[derive(Serialize)]
pub struct DashboardResponse {
    pub posts: Vec<PostStats>,
    pub pending_comments: Vec<PendingComment>,
}

/// Owner dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    tenant: TenantContext,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>> {
    let scope = tenant.require_blog()?;
    require_owner(scope, &user)?;

    let repo = Repository::new(state.db.clone());

    let posts = repo.posts_with_stats(scope.blog_id).await?;
    let pending_comments = repo.pending_comments(scope.blog_id).await?;

    Ok(Json(DashboardResponse {
        posts,
        pending_comments,
    }))
}

/// Post create/edit payload
#[derive(Debug, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    /// Comma-separated tag names
    #[serde(default)]
    pub tags: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub created_at: String,
}

/// Derive the slug, rejecting titles that strip down to nothing
fn slug_for(title: &str) -> Result<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(AppError::Validation {
            message: "Title must contain at least one alphanumeric character".to_string(),
            field: Some("title".to_string()),
        });
    }
    Ok(slug)
}

/// Upsert the comma-separated tag list and link it to the post
async fn apply_tags(repo: &Repository, post_id: i64, tags: &str) -> Result<()> {
    let mut tag_ids = Vec::new();

    for name in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let tag_slug = slugify(name);
        if tag_slug.is_empty() {
            continue;
        }
        tag_ids.push(repo.upsert_tag(name, &tag_slug).await?);
    }

    repo.set_post_tags(post_id, &tag_ids).await
}

/// Create a post, link its tags, and append its shared-index row
pub async fn create_post(
    State(state): State<AppState>,
    tenant: TenantContext,
    CurrentUser(user): CurrentUser,
    Json(request): Json<PostInput>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let scope = tenant.require_blog()?;
    require_owner(scope, &user)?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let slug = slug_for(&request.title)?;
    let repo = Repository::new(state.db.clone());

    let post = repo
        .create_post(
            scope.blog_id,
            user.user_id,
            request.title.clone(),
            slug.clone(),
            request.content,
        )
        .await?;

    apply_tags(&repo, post.id, &request.tags).await?;

    // Discovery index row; written on create, removed on delete
    let post_link = state.config.domain.post_link(&scope.subdomain, &slug);
    repo.add_shared_post(
        post.id,
        scope.subdomain.clone(),
        post.title.clone(),
        post_link,
        post.created_at,
    )
    .await?;

    metrics::record_post_created(&scope.subdomain);

    tracing::info!(
        post_id = post.id,
        subdomain = %scope.subdomain,
        slug = %post.slug,
        "Post created"
    );

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            created_at: post.created_at.to_rfc3339(),
        }),
    ))
}

/// Update a post's title, content and tags
pub async fn edit_post(
    State(state): State<AppState>,
    tenant: TenantContext,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    Json(request): Json<PostInput>,
) -> Result<Json<PostResponse>> {
    let scope = tenant.require_blog()?;
    require_owner(scope, &user)?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let slug = slug_for(&request.title)?;
    let repo = Repository::new(state.db.clone());

    let post = repo
        .update_post(
            scope.blog_id,
            post_id,
            request.title,
            slug,
            request.content,
        )
        .await?;

    apply_tags(&repo, post.id, &request.tags).await?;

    tracing::info!(
        post_id = post.id,
        subdomain = %scope.subdomain,
        "Post updated"
    );

    Ok(Json(PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        created_at: post.created_at.to_rfc3339(),
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Delete a post and its shared-index row
pub async fn delete_post(
    State(state): State<AppState>,
    tenant: TenantContext,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let scope = tenant.require_blog()?;
    require_owner(scope, &user)?;

    let repo = Repository::new(state.db.clone());

    let deleted = repo.delete_post(scope.blog_id, post_id).await?;
    if !deleted {
        return Err(AppError::PostNotFound {
            slug_or_id: post_id.to_string(),
        });
    }

    repo.remove_shared_post(post_id, &scope.subdomain).await?;

    tracing::info!(
        post_id = post_id,
        subdomain = %scope.subdomain,
        "Post deleted"
    );

    Ok(Json(MessageResponse {
        message: "Post deleted".to_string(),
    }))
}

/// Approve a pending comment on one of this blog's posts
pub async fn approve_comment(
    State(state): State<AppState>,
    tenant: TenantContext,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let scope = tenant.require_blog()?;
    require_owner(scope, &user)?;

    let repo = Repository::new(state.db.clone());

    let comment = repo
        .approve_comment(scope.blog_id, comment_id, user.user_id)
        .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id = comment.post_id,
        subdomain = %scope.subdomain,
        "Comment approved"
    );

    Ok(Json(MessageResponse {
        message: "Comment approved".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_owner() {
        let scope = BlogScope {
            blog_id: 1,
            subdomain: "alice".to_string(),
            title: "Alice's Blog".to_string(),
            owner_user_id: 7,
        };

        let owner = Identity {
            user_id: 7,
            email: "alice@example.com".to_string(),
        };
        let stranger = Identity {
            user_id: 8,
            email: "bob@example.com".to_string(),
        };

        assert!(require_owner(&scope, &owner).is_ok());
        assert!(require_owner(&scope, &stranger).is_err());
    }

    #[test]
    fn test_slug_for_rejects_empty() {
        assert_eq!(slug_for("Hello World").unwrap(), "hello-world");
        assert!(slug_for("!!!").is_err());
    }
}
