use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use trainu_calendar::config::AppConfig;
use trainu_calendar::db;
use trainu_calendar::handlers;
use trainu_calendar::services::sync::ghl::GhlCalendarClient;
use trainu_calendar::services::sync::CalendarSync;
use trainu_calendar::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let sync: Option<Box<dyn CalendarSync>> = if config.ghl_configured() {
        tracing::info!("external calendar sync enabled (GHL calendar: {})", config.ghl_calendar_id);
        Some(Box::new(GhlCalendarClient::new(
            config.ghl_base_url.clone(),
            config.ghl_api_key.clone(),
            config.ghl_location_id.clone(),
            config.ghl_calendar_id.clone(),
        )))
    } else {
        tracing::info!("external calendar sync disabled (no GHL credentials)");
        None
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        sync,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/sessions",
            get(handlers::sessions::list_sessions).post(handlers::sessions::create_session),
        )
        .route("/api/sessions/:id", get(handlers::sessions::get_session))
        .route(
            "/api/sessions/:id/update",
            post(handlers::sessions::update_session),
        )
        .route(
            "/api/sessions/:id/delete",
            post(handlers::sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/cancel",
            post(handlers::sessions::cancel_session),
        )
        .route(
            "/api/sessions/:id/reschedule",
            post(handlers::sessions::reschedule_session),
        )
        .route(
            "/api/sessions/:id/complete",
            post(handlers::sessions::complete_session),
        )
        .route(
            "/api/sessions/:id/no-show",
            post(handlers::sessions::mark_no_show),
        )
        .route("/api/sessions/:id/sync", post(handlers::sync::push_session))
        .route(
            "/api/trainers/:trainer_id/rules",
            get(handlers::availability::list_rules).post(handlers::availability::create_rule),
        )
        .route(
            "/api/rules/:id/update",
            post(handlers::availability::update_rule),
        )
        .route(
            "/api/rules/:id/delete",
            post(handlers::availability::delete_rule),
        )
        .route(
            "/api/trainers/:trainer_id/exceptions",
            get(handlers::availability::list_exceptions)
                .post(handlers::availability::create_exception),
        )
        .route(
            "/api/exceptions/:id/delete",
            post(handlers::availability::delete_exception),
        )
        .route(
            "/api/trainers/:trainer_id/slots",
            get(handlers::slots::get_available_slots),
        )
        .route("/calendar/:session_id", get(handlers::calendar::download_ics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
