use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::availability::parse_clock;
use crate::models::{Appointment, AppointmentRequest, Language};
use crate::services::calendar::{book_if_available, generate_ics, CalendarError};
use crate::services::datetime;
use crate::services::nlu::normalize;
use crate::services::nlu::templates::{lookup, render, TemplateId};
use crate::services::scheduling::available_times;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    #[serde(alias = "clientName")]
    pub client_name: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub date: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: Option<String>,
    pub language: Option<String>,
}

fn request_language(state: &AppState, language: Option<&str>) -> Language {
    language
        .map(Language::parse)
        .unwrap_or(state.config.default_language)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// ISO date first, then relative phrases such as "tomorrow" or "el viernes".
fn parse_date(state: &AppState, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| datetime::extract_date(&normalize(raw), (state.today)()))
        .ok_or_else(|| AppError::BadRequest(format!("Could not understand date: {raw}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    parse_clock(raw)
        .ok()
        .or_else(|| datetime::extract_time(&normalize(raw)))
        .ok_or_else(|| AppError::BadRequest(format!("Could not understand time: {raw}")))
}

pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let language = request_language(&state, req.language.as_deref());
    let (Some(client_name), Some(service), Some(date), Some(time)) = (
        non_empty(req.client_name),
        non_empty(req.service),
        non_empty(req.date),
        non_empty(req.time),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields: client_name, service, date, time".to_string(),
        ));
    };

    let request = AppointmentRequest {
        client_name,
        service,
        date: parse_date(&state, &date)?,
        time: parse_time(&time)?,
        email: non_empty(req.email),
        phone: non_empty(req.phone),
        language,
    };
    tracing::info!(
        client = %request.client_name,
        service = %request.service,
        starts_at = %request.starts_at(),
        "booking appointment"
    );

    let duration = i64::from(state.config.appointment_minutes);
    let schedule = &state.nlu.knowledge().schedule;
    match book_if_available(
        &*state.calendar,
        &state.booking_lock,
        schedule,
        &request,
        duration,
    )
    .await
    {
        Ok(appointment) => {
            let date = request.date.format("%Y-%m-%d").to_string();
            let time = request.time.format("%H:%M").to_string();
            let response = render(
                TemplateId::BookingConfirmed,
                language,
                &[
                    ("name", request.client_name.as_str()),
                    ("service", request.service.as_str()),
                    ("date", date.as_str()),
                    ("time", time.as_str()),
                ],
            );
            Ok(Json(BookResponse {
                success: true,
                response,
                appointment: Some(appointment),
                error: None,
            }))
        }
        Err(e) => {
            if matches!(e, CalendarError::Unavailable(_)) {
                tracing::info!(error = %e, "booking rejected");
            } else {
                tracing::error!(error = %e, "failed to book appointment");
            }
            Ok(Json(BookResponse {
                success: false,
                response: lookup(TemplateId::BookingFailed, language).to_string(),
                appointment: None,
                error: Some(e.to_string()),
            }))
        }
    }
}

pub async fn available(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>, AppError> {
    let language = request_language(&state, query.language.as_deref());
    let raw = non_empty(query.date)
        .ok_or_else(|| AppError::BadRequest("Date parameter is required".to_string()))?;
    let date = parse_date(&state, &raw)?;

    let booked = state.calendar.booked_slots(date).await?;
    let times: Vec<String> = available_times(&state.nlu.knowledge().schedule, date, &booked)
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect();

    let date_str = date.format("%Y-%m-%d").to_string();
    let response = if times.is_empty() {
        render(TemplateId::NoAvailableTimes, language, &[("date", date_str.as_str())])
    } else {
        render(
            TemplateId::AvailableTimes,
            language,
            &[("date", date_str.as_str()), ("times", times.join(", ").as_str())],
        )
    };

    Ok(Json(json!({
        "success": true,
        "response": response,
        "date": date_str,
        "available_times": times,
    })))
}

pub async fn parse_datetime(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<Value>, AppError> {
    let language = request_language(&state, req.language.as_deref());
    let text = non_empty(req.text)
        .ok_or_else(|| AppError::BadRequest("Text is required".to_string()))?;

    let parsed = datetime::parse_date_time(&normalize(&text), (state.today)());
    let (Some(date), Some(time)) = (parsed.date, parsed.time) else {
        return Ok(Json(json!({
            "success": false,
            "response": lookup(TemplateId::DateTimeUnclear, language),
            "needs_clarification": true,
        })));
    };

    let date = date.format("%Y-%m-%d").to_string();
    let time = time.format("%H:%M").to_string();
    Ok(Json(json!({
        "success": true,
        "response": render(
            TemplateId::DateTimeUnderstood,
            language,
            &[("date", date.as_str()), ("time", time.as_str())],
        ),
        "parsed_date_time": { "date": date, "time": time },
    })))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.calendar.cancel(&id).await?;
    tracing::info!(id = %id, "appointment cancelled");
    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let appointment = state
        .calendar
        .event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    let ics = generate_ics(
        &appointment,
        &state.config.business_name,
        &state.config.calendar_timezone,
    );
    let filename = format!("appointment-{id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
