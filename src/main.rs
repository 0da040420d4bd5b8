use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use salon_assistant::config::{AppConfig, CalendarBackend};
use salon_assistant::db;
use salon_assistant::handlers;
use salon_assistant::services::calendar::google::GoogleCalendar;
use salon_assistant::services::calendar::local::LocalCalendar;
use salon_assistant::services::calendar::CalendarProvider;
use salon_assistant::services::knowledge::KnowledgeLoader;
use salon_assistant::services::nlu::NluEngine;
use salon_assistant::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let loader = KnowledgeLoader::new(&config.data_dir);
    let knowledge = loader.get();
    tracing::info!(
        services = knowledge.kb.services().len(),
        intents = knowledge.patterns.len(),
        "knowledge base loaded from {}",
        config.data_dir
    );
    let nlu = Arc::new(NluEngine::new(
        Arc::clone(&knowledge.kb),
        Arc::clone(&knowledge.patterns),
    ));

    let calendar: Box<dyn CalendarProvider> = match config.calendar_backend {
        CalendarBackend::Google => {
            anyhow::ensure!(
                !config.google_access_token.is_empty(),
                "GOOGLE_ACCESS_TOKEN must be set when CALENDAR_PROVIDER=google"
            );
            tracing::info!("using Google Calendar (calendar: {})", config.google_calendar_id);
            Box::new(GoogleCalendar::new(
                config.google_calendar_id.clone(),
                config.google_access_token.clone(),
                config.calendar_timezone.clone(),
                config.appointment_minutes,
            ))
        }
        CalendarBackend::Local => {
            tracing::info!("using local calendar (database: {})", config.database_url);
            let conn = db::init_db(&config.database_url)?;
            Box::new(LocalCalendar::new(
                Arc::new(Mutex::new(conn)),
                config.appointment_minutes,
            ))
        }
    };

    if config.twilio_auth_token.is_empty() {
        tracing::warn!("TWILIO_AUTH_TOKEN not set, voice webhook signatures are not checked");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config, nlu, calendar));

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
