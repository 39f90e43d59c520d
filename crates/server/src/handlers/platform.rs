//! Platform-scope handlers: homepage, blog registration, login/logout

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::extract::MaybeUser;
use crate::sidebar::SidebarData;
use crate::tenant::TenantContext;
use crate::AppState;
use inkwell_common::{
    auth::{hash_password, verify_password},
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

/// Summary of a blog for homepage payloads
#[derive(Debug, Serialize)]
pub struct BlogSummary {
    pub subdomain: String,
    pub title: String,
}

/// Summary of a post for listings
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub view_count: i64,
    pub created_at: String,
}

/// Homepage payload; shape depends on the resolved tenant scope
#[derive(Debug, Serialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum HomeResponse {
    Platform {
        /// The caller's own blog, when they are logged in and own one.
        /// The original platform redirected owners to their dashboard;
        /// an API hands the client the target instead.
        #[serde(skip_serializing_if = "Option::is_none")]
        your_blog: Option<BlogSummary>,
        sidebar: SidebarData,
    },
    Blog {
        blog: BlogSummary,
        posts: Vec<PostSummary>,
        sidebar: SidebarData,
    },
}

/// Homepage: tenant scope renders the blog index, platform scope the
/// discovery landing page. The sidebar ships either way.
pub async fn home(
    State(state): State<AppState>,
    tenant: TenantContext,
    sidebar: SidebarData,
    MaybeUser(identity): MaybeUser,
) -> Result<Json<HomeResponse>> {
    let repo = Repository::new(state.db.clone());

    if let Some(scope) = tenant.blog() {
        let posts = repo
            .list_posts(scope.blog_id)
            .await?
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title,
                slug: p.slug,
                view_count: p.view_count,
                created_at: p.created_at.to_rfc3339(),
            })
            .collect();

        return Ok(Json(HomeResponse::Blog {
            blog: BlogSummary {
                subdomain: scope.subdomain.clone(),
                title: scope.title.clone(),
            },
            posts,
            sidebar,
        }));
    }

    let your_blog = match identity {
        Some(user) => repo.find_blog_by_owner(user.user_id).await?.map(|b| BlogSummary {
            subdomain: b.subdomain,
            title: b.title,
        }),
        None => None,
    };

    Ok(Json(HomeResponse::Platform { your_blog, sidebar }))
}

/// Request to register a new blog
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBlogRequest {
    #[validate(custom(function = validate_subdomain))]
    pub subdomain: String,

    #[validate(length(min = 1, max = 100))]
    pub blog_title: String,

    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,
}

/// Response after registering a blog
#[derive(Serialize)]
pub struct RegisterBlogResponse {
    pub blog: BlogSummary,
    pub session_token: String,
}

/// Subdomain rule: 3-50 chars, lowercase alphanumeric runs separated by
/// single hyphens, no leading/trailing/consecutive hyphens.
pub fn is_valid_subdomain(subdomain: &str) -> bool {
    if !(3..=50).contains(&subdomain.len()) {
        return false;
    }

    subdomain.split('-').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}

fn validate_subdomain(subdomain: &str) -> std::result::Result<(), ValidationError> {
    if is_valid_subdomain(subdomain) {
        Ok(())
    } else {
        Err(ValidationError::new("subdomain"))
    }
}

/// Register a new blog: create the owner account, the blog record, and
/// send the welcome mail (best-effort).
pub async fn register_blog(
    State(state): State<AppState>,
    Json(request): Json<RegisterBlogRequest>,
) -> Result<(StatusCode, Json<RegisterBlogResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());

    // Pre-checks; the unique constraints still catch races on insert
    if repo.find_blog_by_subdomain(&request.subdomain).await?.is_some() {
        return Err(AppError::SubdomainTaken {
            subdomain: request.subdomain,
        });
    }

    if repo.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::EmailTaken {
            email: request.email,
        });
    }

    let password_hash = hash_password(&request.password)?;

    let user = repo
        .create_user(request.username.clone(), request.email.clone(), password_hash)
        .await?;

    let blog = repo
        .create_blog(
            request.subdomain.clone(),
            request.blog_title.clone(),
            user.id,
            request.email.clone(),
        )
        .await?;

    metrics::record_blog_registered();

    tracing::info!(
        subdomain = %blog.subdomain,
        blog_id = blog.id,
        owner_user_id = user.id,
        "Blog registered"
    );

    // Welcome mail is best-effort; a relay failure never fails registration
    let blog_url = state.config.domain.blog_url(&blog.subdomain);
    let body = format!(
        "<p>Hello {username},</p>\
         <p>Your new blog, \"{title}\", is live at <a href=\"{url}\">{url}</a>.</p>\
         <p>Your admin dashboard is at <a href=\"{url}/admin/dashboard\">{url}/admin/dashboard</a>.</p>\
         <p>Happy writing!</p>",
        username = request.username,
        title = blog.title,
        url = blog_url,
    );
    if let Err(e) = state
        .mailer
        .send(&request.email, &format!("Welcome to your new blog: {}", blog.title), &body)
        .await
    {
        tracing::warn!(error = %e, email = %request.email, "Welcome mail delivery failed");
    }

    let session_token = state.sessions.issue_token(user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterBlogResponse {
            blog: BlogSummary {
                subdomain: blog.subdomain,
                title: blog.title,
            },
            session_token,
        }),
    ))
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub user_id: i64,
    pub username: String,
}

/// Authenticate against the global users table.
///
/// Unknown email and wrong password produce the same error; the
/// response never reveals which one failed.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());

    let user = repo
        .find_user_by_email(&request.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let session_token = state.sessions.issue_token(user.id, &user.email)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        session_token,
        user_id: user.id,
        username: user.username,
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Logout acknowledgement; session tokens are stateless, the client
/// discards its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_rules() {
        assert!(is_valid_subdomain("alice"));
        assert!(is_valid_subdomain("my-blog-2"));
        assert!(is_valid_subdomain("abc"));

        assert!(!is_valid_subdomain("ab"));
        assert!(!is_valid_subdomain("-alice"));
        assert!(!is_valid_subdomain("alice-"));
        assert!(!is_valid_subdomain("a--b"));
        assert!(!is_valid_subdomain("Alice"));
        assert!(!is_valid_subdomain("al ice"));
        assert!(!is_valid_subdomain(&"a".repeat(51)));
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterBlogRequest {
            subdomain: "alice".to_string(),
            blog_title: "Alice's Blog".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_subdomain = RegisterBlogRequest {
            subdomain: "-alice".to_string(),
            ..destructure(&valid)
        };
        assert!(bad_subdomain.validate().is_err());

        let bad_email = RegisterBlogRequest {
            email: "not-an-email".to_string(),
            ..destructure(&valid)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterBlogRequest {
            password: "short".to_string(),
            ..destructure(&valid)
        };
        assert!(short_password.validate().is_err());
    }

    fn destructure(req: &RegisterBlogRequest) -> RegisterBlogRequest {
        RegisterBlogRequest {
            subdomain: req.subdomain.clone(),
            blog_title: req.blog_title.clone(),
            username: req.username.clone(),
            email: req.email.clone(),
            password: req.password.clone(),
        }
    }
}
