//! Subdomain-to-tenant resolution
//!
//! Runs once per request, before route dispatch: parse the Host header
//! against the canonical domain, look the candidate label up in the
//! blogs table, and thread a `TenantContext` through the request as an
//! extension. An unknown subdomain silently demotes the request to
//! platform scope; it is never an error.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::HOST, request::Parts},
    middleware::Next,
    response::Response,
};
use inkwell_common::{
    db::{models::Blog, Repository},
    errors::{AppError, Result},
    metrics, RESERVED_WWW_LABEL,
};

use crate::AppState;

/// Tenant scope a blog-context request runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogScope {
    pub blog_id: i64,
    pub subdomain: String,
    pub title: String,
    pub owner_user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Platform,
    Blog(BlogScope),
}

/// Per-request tenant context, built once before route dispatch and
/// handed to handlers as an explicit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    scope: Scope,
}

impl TenantContext {
    /// Non-tenant (base-domain) scope
    pub fn platform() -> Self {
        Self {
            scope: Scope::Platform,
        }
    }

    /// Scope for a resolved blog
    pub fn for_blog(blog: &Blog) -> Self {
        Self {
            scope: Scope::Blog(BlogScope {
                blog_id: blog.id,
                subdomain: blog.subdomain.clone(),
                title: blog.title.clone(),
                owner_user_id: blog.owner_user_id,
            }),
        }
    }

    pub fn is_tenant(&self) -> bool {
        matches!(self.scope, Scope::Blog(_))
    }

    pub fn subdomain(&self) -> Option<&str> {
        match &self.scope {
            Scope::Blog(b) => Some(&b.subdomain),
            Scope::Platform => None,
        }
    }

    pub fn blog_id(&self) -> Option<i64> {
        match &self.scope {
            Scope::Blog(b) => Some(b.blog_id),
            Scope::Platform => None,
        }
    }

    pub fn blog(&self) -> Option<&BlogScope> {
        match &self.scope {
            Scope::Blog(b) => Some(b),
            Scope::Platform => None,
        }
    }

    /// Blog scope for routes that only exist on a subdomain
    pub fn require_blog(&self) -> Result<&BlogScope> {
        self.blog().ok_or(AppError::BlogNotFound)
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal {
                message: "Tenant context missing from request".to_string(),
            })
    }
}

/// Drop an optional `:port` suffix from a host string.
fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// Extract the subdomain candidate from a request host.
///
/// Returns `None` for the canonical domain itself, `www`, empty or
/// dotted labels, and hosts outside the canonical domain entirely.
/// Purely ASCII string logic; no wildcard or punycode handling.
pub fn subdomain_candidate(host: &str, canonical: &str) -> Option<String> {
    let host = strip_port(host).to_ascii_lowercase();
    let canonical = strip_port(canonical).to_ascii_lowercase();

    if canonical.is_empty() || host == canonical {
        return None;
    }

    let label = host.strip_suffix(&format!(".{}", canonical))?;

    if label.is_empty() || label.contains('.') || label == RESERVED_WWW_LABEL {
        return None;
    }

    Some(label.to_string())
}

/// Middleware: resolve the tenant for this request and attach the
/// context before any handler runs.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let context = build_context(&state, host).await?;
    request.extensions_mut().insert(context);

    // Discovery sidebar: fetched on every request, tenant or not,
    // best-effort by construction
    let repo = Repository::new(state.db.clone());
    let sidebar = crate::sidebar::SidebarData::fetch(&repo, &state.config.sidebar).await;
    request.extensions_mut().insert(sidebar);

    let request_metrics =
        metrics::RequestMetrics::start(request.method().as_str(), request.uri().path());

    let response = next.run(request).await;
    request_metrics.finish(response.status().as_u16());

    Ok(response)
}

async fn build_context(state: &AppState, host: &str) -> Result<TenantContext> {
    let canonical = state.config.domain.canonical_domain();

    let Some(candidate) = subdomain_candidate(host, canonical) else {
        metrics::record_tenant_lookup("platform");
        return Ok(TenantContext::platform());
    };

    // Re-queried on every request; no cross-request cache.
    let repo = Repository::new(state.db.clone());

    match repo.find_blog_by_subdomain(&candidate).await? {
        Some(blog) => {
            metrics::record_tenant_lookup("hit");
            tracing::debug!(subdomain = %blog.subdomain, blog_id = blog.id, "Tenant resolved");
            Ok(TenantContext::for_blog(&blog))
        }
        None => {
            // Unknown subdomain: demote to platform scope, discard the candidate
            metrics::record_tenant_lookup("miss");
            tracing::debug!(candidate = %candidate, "No blog for subdomain, using platform scope");
            Ok(TenantContext::platform())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_domain_is_platform() {
        assert_eq!(subdomain_candidate("example.com", "example.com"), None);
        assert_eq!(subdomain_candidate("example.com:5000", "example.com"), None);
        assert_eq!(subdomain_candidate("example.com", "example.com:5000"), None);
    }

    #[test]
    fn test_single_label_subdomain() {
        assert_eq!(
            subdomain_candidate("alice.example.com", "example.com"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_port_is_ignored() {
        assert_eq!(
            subdomain_candidate("alice.example.com:5000", "example.com"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_www_is_reserved() {
        assert_eq!(subdomain_candidate("www.example.com", "example.com"), None);
        assert_eq!(subdomain_candidate("WWW.example.com", "example.com"), None);
    }

    #[test]
    fn test_multiple_labels_are_platform() {
        assert_eq!(subdomain_candidate("a.b.example.com", "example.com"), None);
    }

    #[test]
    fn test_unrelated_host_is_platform() {
        assert_eq!(subdomain_candidate("other.org", "example.com"), None);
        // Suffix match requires the dot separator
        assert_eq!(subdomain_candidate("badexample.com", "example.com"), None);
    }

    #[test]
    fn test_empty_canonical_is_platform() {
        assert_eq!(subdomain_candidate("alice.example.com", ""), None);
    }

    #[test]
    fn test_host_is_lowercased() {
        assert_eq!(
            subdomain_candidate("Alice.Example.COM", "example.com"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_platform_context_accessors() {
        let ctx = TenantContext::platform();
        assert!(!ctx.is_tenant());
        assert_eq!(ctx.subdomain(), None);
        assert_eq!(ctx.blog_id(), None);
        assert!(ctx.require_blog().is_err());
    }
}
