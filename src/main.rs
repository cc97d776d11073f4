use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use courtbook::config::AppConfig;
use courtbook::db;
use courtbook::handlers;
use courtbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        events_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/venues",
            get(handlers::venues::list_venues).post(handlers::venues::create_venue),
        )
        .route("/api/venues/search", get(handlers::venues::search_venues))
        .route("/api/venues/:id", get(handlers::venues::get_venue))
        .route(
            "/api/venues/:id/bookings",
            get(handlers::venues::venue_bookings),
        )
        .route("/api/users", post(handlers::users::register_user))
        .route(
            "/api/users/:id/bookings",
            get(handlers::users::user_bookings),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route(
            "/api/bookings/availability",
            get(handlers::bookings::check_availability),
        )
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/bookings/:id/payment",
            post(handlers::bookings::attach_payment),
        )
        .route("/api/admin/bookings", get(handlers::admin::all_bookings))
        .route(
            "/api/admin/bookings/:id/status",
            post(handlers::admin::update_booking_status),
        )
        .route("/api/admin/stats", get(handlers::admin::booking_stats))
        .route(
            "/api/admin/manager/:manager_id/bookings",
            get(handlers::admin::manager_bookings),
        )
        .route("/api/admin/events", get(handlers::admin::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
