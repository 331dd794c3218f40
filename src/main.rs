//! Team Points Scoreboard Backend
//!
//! A production-grade REST backend with SQLite persistence, points
//! aggregation, and a broadcast change feed driving leader-change toasts.

mod api;
mod auth;
mod avatar;
mod config;
mod db;
mod errors;
mod models;
mod notify;
mod score;
mod undo;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use models::catalog;
use notify::{ChangeFeed, NotificationCenter};
use score::leader::LeaderContext;
use score::window;
use undo::UndoCoordinator;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub feed: Arc<ChangeFeed>,
    pub notifications: Arc<NotificationCenter>,
    pub undo: Arc<UndoCoordinator>,
    pub leader: Arc<Mutex<LeaderContext>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Team Points Scoreboard Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the domain gate is not configured
    if config.allowed_domain.is_none() {
        tracing::warn!(
            "No allowed e-mail domain configured (SCOREBOARD_ALLOWED_DOMAIN). Any signed-in domain is accepted!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
        feed: Arc::new(ChangeFeed::new(256)),
        notifications: Arc::new(NotificationCenter::new()),
        undo: Arc::new(UndoCoordinator::new()),
        leader: Arc::new(Mutex::new(LeaderContext::new())),
    };

    // React to store changes independently of the mutating handlers
    spawn_leader_watcher(state.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the domain gate for the identity layer
    let allowed_domain = state.config.allowed_domain.clone();

    // API routes
    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Tasks
        .route("/tasks", get(api::list_tasks))
        // Members
        .route("/members", get(api::list_members))
        .route("/members/register", post(api::register_member))
        .route("/members/profile", put(api::update_profile))
        // Entries
        .route("/entries", get(api::list_entries))
        .route("/entries", post(api::create_entry))
        .route("/entries/{id}", put(api::update_entry))
        .route("/entries/{id}", delete(api::delete_entry))
        .route("/entries/restore/{token}", post(api::restore_entry))
        // Leaderboard
        .route("/leaderboard", get(api::get_leaderboard))
        .route("/leaderboard/last-week", get(api::get_last_week_winner))
        // Notifications
        .route("/notifications", get(api::list_notifications))
        .route("/notifications/{id}/dismiss", post(api::dismiss_notification))
        // Apply identity middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::identity_layer(allowed_domain.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Watch the change feed and celebrate leader changes.
///
/// Runs decoupled from the mutating handlers: every change notification
/// triggers a full reload and recompute, which is idempotent under duplicate
/// or reordered deliveries. A lagged receiver just reloads on the next event.
pub fn spawn_leader_watcher(state: AppState) {
    tokio::spawn(async move {
        let mut rx = state.feed.subscribe();
        loop {
            match rx.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }

            if let Err(e) = check_leader(&state).await {
                tracing::warn!("Leader check failed: {}", e);
            }
        }
    });
}

/// Recompute current-week standings and push a toast when the leader changed.
async fn check_leader(state: &AppState) -> Result<(), errors::AppError> {
    let members = state.repo.list_members().await?;
    let entries = state.repo.list_entries().await?;

    let cat = catalog();
    let start = window::week_start(Utc::now());
    let totals = score::member_totals(&entries, &cat, |t| window::in_week(t, start));
    let standings = score::standings(&totals, &members);

    let change = state.leader.lock().await.observe(&standings);
    if let Some(change) = change {
        tracing::info!("New leader: {} ({} pts)", change.name, change.total);
        state
            .notifications
            .push_celebration(format!(
                "{} takes the lead with {} pts!",
                change.name, change.total
            ))
            .await;
    }

    Ok(())
}
