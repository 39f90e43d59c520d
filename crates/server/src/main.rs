//! Inkwell HTTP server
//!
//! The single entry point for all platform and tenant traffic.
//! Handles:
//! - Subdomain-to-tenant resolution on every request
//! - Authentication and session resolution
//! - Rate limiting on anonymous writes
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod extract;
mod handlers;
mod middleware;
mod sidebar;
mod tenant;

use axum::{
    routing::{get, post},
    Router,
};
use inkwell_common::{
    auth::{generate_session_secret, SessionManager},
    config::AppConfig,
    db::DbPool,
    mail::{self, Mailer},
    metrics,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub sessions: Arc<SessionManager>,
    pub mailer: Arc<dyn Mailer>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .json()
        .init();

    info!("Starting Inkwell server v{}", inkwell_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    if config.database.apply_schema {
        db.apply_schema().await?;
    }

    // Session manager; an ephemeral secret invalidates sessions on restart
    let secret = match config.auth.session_secret {
        Some(ref secret) => secret.clone(),
        None => {
            tracing::warn!("No session secret configured, generating an ephemeral one");
            generate_session_secret()
        }
    };
    let sessions = Arc::new(SessionManager::new(
        &secret,
        config.auth.session_expiration_secs,
    ));

    let mailer: Arc<dyn Mailer> = mail::from_config(&config.mail)?.into();

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        sessions,
        mailer,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Anonymous write endpoints sit behind the rate limiter
    let mut anon_routes = Router::new()
        .route("/register-blog", post(handlers::platform::register_blog))
        .route("/login", post(handlers::platform::login));

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        anon_routes = anon_routes.layer(axum::middleware::from_fn(move |request, next| {
            let limiter = limiter.clone();
            async move { middleware::rate_limit::rate_limit_middleware(request, next, limiter).await }
        }));
    }

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Homepage (platform or tenant, decided by the resolved scope)
        .route("/", get(handlers::platform::home))
        .route("/logout", get(handlers::platform::logout))
        .merge(anon_routes)

        // Public tenant endpoints
        .route("/posts/{post}", get(handlers::posts::post_detail))
        .route("/posts/{post}/comments", post(handlers::posts::submit_comment))
        .route("/posts/{post}/like", post(handlers::posts::like_post))

        // Owner admin endpoints
        .route("/admin/dashboard", get(handlers::admin::dashboard))
        .route("/admin/posts/new", post(handlers::admin::create_post))
        .route("/admin/posts/edit/{id}", post(handlers::admin::edit_post))
        .route("/admin/posts/delete/{id}", post(handlers::admin::delete_post))
        .route("/admin/comments/approve/{id}", get(handlers::admin::approve_comment))

        // Tenant resolution runs before every handler above
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            tenant::resolve_tenant,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
