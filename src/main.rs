//! Leads Console Backend
//!
//! Serves the lead management screens of the agency admin dashboard: holds the
//! lead master list fetched from the upstream REST API, derives filtered views
//! and counts, and gates every write through the permission policy.

mod api;
mod auth;
mod config;
mod errors;
mod leads;
mod models;
mod session;
mod upstream;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use leads::LeadStore;
use session::Session;
use upstream::{HttpLeadsApi, LeadsApi};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<LeadStore>>,
    pub session: Arc<RwLock<Session>>,
    pub upstream: Arc<dyn LeadsApi>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn LeadsApi>, session: Session) -> Self {
        Self {
            store: Arc::new(RwLock::new(LeadStore::new())),
            session: Arc::new(RwLock::new(session)),
            upstream,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Leads Console");
    tracing::info!("Upstream API: {}", config.upstream_url);
    tracing::info!("Session cache: {:?}", config.session_cache);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No console key configured (LEADS_API_PSK). Authentication is disabled!");
    }
    if config.upstream_token.is_none() {
        tracing::warn!("No upstream token configured (LEADS_UPSTREAM_TOKEN)");
    }

    let upstream: Arc<dyn LeadsApi> = Arc::new(HttpLeadsApi::new(&config)?);

    // Serve from the cached admin right away; bootstrap swaps in the fresh one.
    let cached = session::load_cached(&config.session_cache).await;
    if let Some(admin) = &cached {
        tracing::info!(admin = %admin.id, "Loaded cached admin session");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, upstream, Session::new(cached));

    tokio::spawn(bootstrap(state.clone()));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Refresh the session, then load the lead master list and team roster.
///
/// Failures are logged and leave whatever was there; the dashboard can retry
/// through the refresh endpoints.
pub async fn bootstrap(state: AppState) {
    let upstream = state.upstream.as_ref();

    if let Err(e) = session::refresh(&state.session, upstream, &state.config.session_cache).await
    {
        tracing::warn!("Continuing with cached session: {}", e);
    }
    if let Err(e) = leads::fetch_all(&state.store, upstream).await {
        tracing::warn!("Initial lead load failed: {}", e);
    }
    if let Err(e) = leads::load_members(&state.store, upstream).await {
        tracing::warn!("Initial team roster load failed: {}", e);
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session
        .route("/session", get(api::get_session))
        .route("/session/refresh", post(api::refresh_session))
        // Leads
        .route("/leads", get(api::list_leads))
        .route(
            "/leads/refresh",
            post(api::refresh_leads).delete(api::cancel_refresh),
        )
        .route(
            "/leads/{id}",
            get(api::get_lead)
                .patch(api::update_lead)
                .delete(api::delete_lead),
        )
        .route("/leads/{id}/contacted", post(api::mark_lead_contacted))
        .route("/leads/{id}/close", post(api::close_lead))
        .route("/leads/{id}/assignment", put(api::assign_lead))
        // Team
        .route("/team-members", get(api::list_team_members))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_console_key,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
