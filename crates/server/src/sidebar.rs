//! Discovery sidebar fetcher
//!
//! Two independent datasets fetched once per request, tenant or not.
//! Sidebar content is decorative: a failed query is logged, counted,
//! and replaced with an empty list, never an error.

use axum::{extract::FromRequestParts, http::request::Parts};
use inkwell_common::{
    config::SidebarConfig,
    db::{BlogCard, Repository, SharedPostCard},
    errors::{AppError, Result},
    metrics,
};
use serde::Serialize;

/// Sidebar payload shipped with homepage responses
#[derive(Debug, Clone, Default, Serialize)]
pub struct SidebarData {
    /// Cross-tenant posts from the trailing window, random order
    pub recent_posts: Vec<SharedPostCard>,

    /// Random tenant sample
    pub blogs: Vec<BlogCard>,
}

impl SidebarData {
    /// Fetch both datasets concurrently, best-effort.
    pub async fn fetch(repo: &Repository, config: &SidebarConfig) -> Self {
        let (recent_posts, blogs) = futures::join!(
            repo.recent_shared_posts(config.window_days, config.limit),
            repo.random_blogs(config.limit),
        );

        let recent_posts = recent_posts.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Recent posts sidebar query failed");
            metrics::record_sidebar_failure("recent_posts");
            Vec::new()
        });

        let blogs = blogs.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Random blogs sidebar query failed");
            metrics::record_sidebar_failure("blogs");
            Vec::new()
        });

        Self {
            recent_posts,
            blogs,
        }
    }
}

/// Fetched once per request by the tenant middleware; handlers pull it
/// from the request extensions.
impl<S> FromRequestParts<S> for SidebarData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<SidebarData>()
            .cloned()
            .ok_or_else(|| AppError::Internal {
                message: "Sidebar data missing from request".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let sidebar = SidebarData::default();
        assert!(sidebar.recent_posts.is_empty());
        assert!(sidebar.blogs.is_empty());
    }
}
