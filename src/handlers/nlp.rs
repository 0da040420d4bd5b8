use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{Entity, LanguageHint, ServiceCategory, ServiceVariant};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub response: String,
    pub intent: &'static str,
    pub confidence: f32,
    pub language: &'static str,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit<'a> {
    Category {
        service: &'a ServiceCategory,
        #[serde(rename = "match")]
        matched: &'a str,
    },
    Variant {
        service: &'a ServiceCategory,
        variant: &'a ServiceVariant,
        #[serde(rename = "match")]
        matched: &'a str,
    },
}

fn language_hint(state: &AppState, language: Option<&str>) -> LanguageHint {
    language
        .map(LanguageHint::parse)
        .unwrap_or(LanguageHint::Fixed(state.config.default_language))
}

/// Only a missing or empty string is rejected; blank text still gets a reply.
fn required_text(text: Option<String>) -> Result<String, AppError> {
    text.filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Text is required".to_string()))
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    let text = required_text(req.text)?;
    let hint = language_hint(&state, req.language.as_deref());
    tracing::info!(text = %text, language = ?hint, "nlp process");

    let reply = state.nlu.process(&text, hint);
    Ok(Json(ProcessResponse {
        success: true,
        response: reply.response,
        intent: reply.intent.kind.as_str(),
        confidence: reply.intent.confidence,
        language: reply.intent.language.as_str(),
        entities: reply.intent.entities,
    }))
}

pub async fn test_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Result<Json<Value>, AppError> {
    let text = required_text(req.text)?;
    let hint = language_hint(&state, req.language.as_deref());

    let reply = state.nlu.process(&text, hint);
    Ok(Json(json!({
        "success": true,
        "input": text,
        "language": reply.intent.language,
        "intent": reply.intent,
        "response": reply.response,
    })))
}

pub async fn conversation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversationRequest>,
) -> Result<Json<Value>, AppError> {
    let latest = req
        .messages
        .last()
        .ok_or_else(|| AppError::BadRequest("Messages array is required".to_string()))?;
    let hint = language_hint(&state, req.language.as_deref());

    let reply = state.nlu.process(&latest.text, hint);
    let context: &[ChatMessage] = if req.messages.len() > 1 {
        &req.messages[req.messages.len().saturating_sub(3)..]
    } else {
        &[]
    };

    Ok(Json(json!({
        "success": true,
        "response": reply.response,
        "intent": reply.intent.kind,
        "confidence": reply.intent.confidence,
        "language": reply.intent.language,
        "context": context,
        "entities": reply.intent.entities,
    })))
}

pub async fn list_intents(State(state): State<Arc<AppState>>) -> Json<Value> {
    let patterns = state.nlu.patterns();
    Json(json!({
        "success": true,
        "intents": patterns.intent_names().collect::<Vec<_>>(),
        "patterns": patterns.patterns(),
    }))
}

pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Value> {
    let services = state.nlu.knowledge().services();
    Json(json!({
        "success": true,
        "services": services,
        "total_services": services.len(),
    }))
}

/// Category whose name, or hyphenated name, contains the path segment.
pub async fn get_service_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Value>, AppError> {
    let wanted = category.to_lowercase();
    let service = state
        .nlu
        .knowledge()
        .services()
        .iter()
        .find(|s| {
            let name = s.category.to_lowercase();
            name.contains(&wanted) || name.split_whitespace().collect::<Vec<_>>().join("-").contains(&wanted)
        })
        .ok_or_else(|| AppError::NotFound("Service category not found".to_string()))?;

    Ok(Json(json!({ "success": true, "service": service })))
}

pub async fn get_schedule(State(state): State<Arc<AppState>>) -> Json<Value> {
    let schedule = &state.nlu.knowledge().schedule;
    Json(json!({
        "success": true,
        "business_hours": schedule.business_hours.clone().unwrap_or_default(),
        "location": schedule.location.clone().unwrap_or_default(),
        "parking": schedule.parking.clone().unwrap_or_default(),
    }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let query = req
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;
    let term = query.to_lowercase();

    let mut results = Vec::new();
    for service in state.nlu.knowledge().services() {
        if service.category.to_lowercase().contains(&term) {
            results.push(SearchHit::Category {
                service,
                matched: &service.category,
            });
        }
        for variant in &service.variants {
            if variant.name.to_lowercase().contains(&term)
                || variant.description.to_lowercase().contains(&term)
            {
                results.push(SearchHit::Variant {
                    service,
                    variant,
                    matched: &variant.name,
                });
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "query": query,
        "total_results": results.len(),
        "results": results,
    })))
}

pub async fn nlp_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let kb = state.nlu.knowledge();
    Json(json!({
        "success": true,
        "status": "healthy",
        "data_loaded": {
            "services": kb.services().len(),
            "intents": state.nlu.patterns().len(),
            "schedule": kb.schedule.business_hours.is_some(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
