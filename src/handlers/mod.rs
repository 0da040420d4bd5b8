pub mod calendar;
pub mod health;
pub mod nlp;
pub mod twilio;
pub mod voice;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

static CHAT_HTML: &str = include_str!("../web/chat.html");

pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_HTML)
}

pub fn router(state: Arc<AppState>) -> Router {
    let nlp = Router::new()
        .route("/process", post(nlp::process))
        .route("/test", post(nlp::test_intent))
        .route("/conversation", post(nlp::conversation))
        .route("/intents", get(nlp::list_intents))
        .route("/services", get(nlp::list_services))
        .route("/services/:category", get(nlp::get_service_category))
        .route("/schedule", get(nlp::get_schedule))
        .route("/search", post(nlp::search))
        .route("/health", get(nlp::nlp_health));

    let voice = Router::new()
        .route("/incoming", post(voice::incoming))
        .route("/process", post(voice::process))
        .route("/appointment", post(voice::appointment))
        .route("/status", post(voice::status))
        .route("/calls", get(voice::calls));

    let calendar = Router::new()
        .route("/book", post(calendar::book))
        .route("/available", get(calendar::available))
        .route("/parse-datetime", post(calendar::parse_datetime))
        .route("/events/:id/cancel", post(calendar::cancel));

    Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health::health))
        .route("/calendar/:id", get(calendar::download_ics))
        .nest("/api/nlp", nlp)
        .nest("/api/voice", voice)
        .nest("/api/calendar", calendar)
        .with_state(state)
}
