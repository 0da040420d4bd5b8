use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{AppointmentRequest, IntentKind, Language, LanguageHint};
use crate::services::calendar::{book_if_available, CalendarError};
use crate::services::nlu::templates::{lookup, render, TemplateId};
use crate::services::scheduling::available_times;
use crate::services::speech::{format_for_speech, MissingField, PendingAppointment};
use crate::services::telephony::TwilioCalls;
use crate::state::AppState;

use super::twilio::{param, verify_request, FormParams, VoiceResponse};

const PROCESS_PATH: &str = "/api/voice/process";
const APPOINTMENT_PATH: &str = "/api/voice/appointment";

fn call_language(state: &AppState, params: &[(String, String)]) -> Language {
    param(params, "Language")
        .map(Language::parse)
        .unwrap_or(state.config.default_language)
}

pub async fn incoming(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<FormParams>,
) -> Result<VoiceResponse, AppError> {
    verify_request(&state.config, &headers, "/api/voice/incoming", &params)?;
    let language = call_language(&state, &params);
    tracing::info!(call_sid = param(&params, "CallSid").unwrap_or("-"), "incoming call");

    Ok(VoiceResponse::new()
        .say(lookup(TemplateId::VoiceWelcome, language), language)
        .gather(PROCESS_PATH, language))
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<FormParams>,
) -> Result<VoiceResponse, AppError> {
    verify_request(&state.config, &headers, PROCESS_PATH, &params)?;
    let language = call_language(&state, &params);
    let call_sid = param(&params, "CallSid").unwrap_or_default();

    let Some(speech) = param(&params, "SpeechResult") else {
        tracing::warn!(call_sid, "no speech recognised");
        return Ok(VoiceResponse::new()
            .say(lookup(TemplateId::VoiceError, language), language)
            .gather(PROCESS_PATH, language));
    };
    tracing::info!(call_sid, text = %speech, "processing speech");

    let reply = state.nlu.process(speech, LanguageHint::Fixed(language));
    let twiml = VoiceResponse::new().say(&format_for_speech(&reply.response), language);

    if reply.intent.kind == IntentKind::Goodbye {
        state.pending_calls.forget(call_sid);
        return Ok(twiml.hangup());
    }

    if reply.intent.kind.is_appointment() {
        // Details given along with the request count towards the booking
        let mut pending = PendingAppointment::default();
        pending.absorb(speech, (state.today)());
        pending.phone = param(&params, "From").map(str::to_string);
        state.pending_calls.remember(call_sid, pending);
        return Ok(twiml.gather(APPOINTMENT_PATH, language));
    }

    Ok(twiml.gather(PROCESS_PATH, language))
}

pub async fn appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<FormParams>,
) -> Result<VoiceResponse, AppError> {
    verify_request(&state.config, &headers, APPOINTMENT_PATH, &params)?;
    let language = call_language(&state, &params);
    let call_sid = param(&params, "CallSid").unwrap_or_default();
    let speech = param(&params, "SpeechResult").unwrap_or_default();
    tracing::info!(call_sid, text = %speech, "appointment details");

    let mut pending = state.pending_calls.take(call_sid);
    pending.absorb(speech, (state.today)());
    if pending.phone.is_none() {
        pending.phone = param(&params, "From").map(str::to_string);
    }

    let request = match (
        pending.missing(),
        pending.client_name.clone(),
        pending.service.clone(),
        pending.date,
        pending.time,
    ) {
        (None, Some(client_name), Some(service), Some(date), Some(time)) => AppointmentRequest {
            client_name,
            service,
            date,
            time,
            email: None,
            phone: pending.phone.clone(),
            language,
        },
        (missing, ..) => {
            let prompt = match missing.unwrap_or(MissingField::Name) {
                MissingField::Name => TemplateId::AskName,
                MissingField::Service => TemplateId::AskService,
                MissingField::Date => TemplateId::AskDate,
                MissingField::Time => TemplateId::AskTime,
            };
            state.pending_calls.remember(call_sid, pending);
            return Ok(VoiceResponse::new()
                .say(lookup(prompt, language), language)
                .gather(APPOINTMENT_PATH, language));
        }
    };

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
            tracing::info!(call_sid, id = %appointment.id, "appointment booked by phone");
            let date = request.date.format("%Y-%m-%d").to_string();
            let time = request.time.format("%H:%M").to_string();
            let confirmation = render(
                TemplateId::BookingConfirmed,
                language,
                &[
                    ("name", request.client_name.as_str()),
                    ("service", request.service.as_str()),
                    ("date", date.as_str()),
                    ("time", time.as_str()),
                ],
            );
            Ok(VoiceResponse::new()
                .say(&format_for_speech(&confirmation), language)
                .say(lookup(TemplateId::VoiceFarewell, language), language)
                .hangup())
        }
        Err(CalendarError::Unavailable(reason)) => {
            // Offer the free times that day and ask again
            tracing::info!(call_sid, reason = %reason, "requested time unavailable");
            let booked = state.calendar.booked_slots(request.date).await?;
            let times: Vec<String> = available_times(schedule, request.date, &booked)
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect();
            let date = request.date.format("%Y-%m-%d").to_string();
            let prompt = if times.is_empty() {
                pending.date = None;
                render(TemplateId::NoAvailableTimes, language, &[("date", date.as_str())])
            } else {
                render(
                    TemplateId::AvailableTimes,
                    language,
                    &[("date", date.as_str()), ("times", times.join(", ").as_str())],
                )
            };
            pending.time = None;
            state.pending_calls.remember(call_sid, pending);
            Ok(VoiceResponse::new()
                .say(&prompt, language)
                .gather(APPOINTMENT_PATH, language))
        }
        Err(e) => {
            tracing::error!(call_sid, error = %e, "failed to book appointment");
            Ok(VoiceResponse::new()
                .say(lookup(TemplateId::BookingFailed, language), language)
                .hangup())
        }
    }
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<FormParams>,
) -> Result<Response, AppError> {
    verify_request(&state.config, &headers, "/api/voice/status", &params)?;
    let call_sid = param(&params, "CallSid").unwrap_or_default();
    let call_status = param(&params, "CallStatus").unwrap_or("unknown");

    match call_status {
        "completed" => tracing::info!(call_sid, "call completed"),
        "failed" | "busy" | "no-answer" | "canceled" => {
            tracing::warn!(call_sid, status = call_status, "call did not complete")
        }
        _ => tracing::info!(call_sid, status = call_status, "call status"),
    }
    if matches!(call_status, "completed" | "failed" | "busy" | "no-answer" | "canceled") {
        state.pending_calls.forget(call_sid);
    }

    Ok(StatusCode::OK.into_response())
}

/// Last 20 calls from the Twilio account's call log.
pub async fn calls(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let client = TwilioCalls::from_credentials(
        &state.config.twilio_account_sid,
        &state.config.twilio_auth_token,
    )
    .ok_or_else(|| {
        AppError::NotConfigured("Twilio account credentials are not configured".to_string())
    })?;

    let calls = client.recent_calls(20).await.map_err(|e| {
        tracing::error!(error = %e, "failed to fetch call history");
        AppError::Upstream("Failed to fetch call history".to_string())
    })?;

    Ok(Json(json!({ "success": true, "calls": calls })))
}
