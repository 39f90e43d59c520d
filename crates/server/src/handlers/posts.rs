//! Public post handlers on tenant blogs: detail, comments, likes

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use validator::Validate;

use crate::tenant::TenantContext;
use crate::AppState;
use inkwell_common::{
    auth::liker_hash,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

/// Tag payload on post detail
#[derive(Serialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
}

/// Approved comment payload on post detail
#[derive(Serialize)]
pub struct CommentView {
    pub author_name: String,
    pub body: String,
    pub created_at: String,
}

/// Post detail payload
#[derive(Serialize)]
pub struct PostDetailResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub view_count: i64,
    pub like_count: u64,
    pub tags: Vec<TagView>,
    pub comments: Vec<CommentView>,
    pub created_at: String,
    pub updated_at: String,
}

/// Single post on a tenant blog. Bumps the view counter and returns
/// only approved comments.
pub async fn post_detail(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>> {
    let scope = tenant.require_blog()?;
    let repo = Repository::new(state.db.clone());

    let post = repo
        .find_post_by_slug(scope.blog_id, &slug)
        .await?
        .ok_or(AppError::PostNotFound {
            slug_or_id: slug.clone(),
        })?;

    repo.increment_view_count(post.id).await?;

    let tags = repo
        .tags_for_post(post.id)
        .await?
        .into_iter()
        .map(|t| TagView {
            name: t.name,
            slug: t.slug,
        })
        .collect();

    let comments = repo
        .approved_comments(post.id)
        .await?
        .into_iter()
        .map(|c| CommentView {
            author_name: c.author_name,
            body: c.body,
            created_at: c.created_at.to_rfc3339(),
        })
        .collect();

    let like_count = repo.like_count(post.id).await?;

    Ok(Json(PostDetailResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        content: post.content,
        // The counter was bumped after this row was read
        view_count: post.view_count + 1,
        like_count,
        tags,
        comments,
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }))
}

/// Comment submission payload
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 100))]
    pub author_name: String,

    #[validate(email)]
    pub author_email: Option<String>,

    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Serialize)]
pub struct CommentSubmittedResponse {
    pub comment_id: i64,
    pub message: String,
}

/// Submit a comment on a post. Comments start unapproved and stay
/// hidden until the blog owner approves them.
pub async fn submit_comment(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(slug): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentSubmittedResponse>)> {
    let scope = tenant.require_blog()?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());

    let post = repo
        .find_post_by_slug(scope.blog_id, &slug)
        .await?
        .ok_or(AppError::PostNotFound {
            slug_or_id: slug.clone(),
        })?;

    let comment = repo
        .add_comment(
            post.id,
            request.author_name,
            request.author_email,
            request.body,
        )
        .await?;

    metrics::record_comment_submitted(&scope.subdomain);

    tracing::info!(
        comment_id = comment.id,
        post_id = post.id,
        subdomain = %scope.subdomain,
        "Comment submitted for moderation"
    );

    Ok((
        StatusCode::CREATED,
        Json(CommentSubmittedResponse {
            comment_id: comment.id,
            message: "Your comment has been submitted and is awaiting moderation".to_string(),
        }),
    ))
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub like_count: u64,
}

/// Like a post. The liker is identified by a hash of the client address
/// and user agent; a second like from the same identifier is a 409.
pub async fn like_post(
    State(state): State<AppState>,
    tenant: TenantContext,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Result<Json<LikeResponse>> {
    let scope = tenant.require_blog()?;
    let repo = Repository::new(state.db.clone());

    // Scope check before writing anything
    let post = repo
        .find_post_by_id(scope.blog_id, post_id)
        .await?
        .ok_or(AppError::PostNotFound {
            slug_or_id: post_id.to_string(),
        })?;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let liker = liker_hash(&addr.ip().to_string(), user_agent);

    repo.add_like(post.id, &liker).await?;

    metrics::record_like(&scope.subdomain);

    let like_count = repo.like_count(post.id).await?;

    Ok(Json(LikeResponse { like_count }))
}
