use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};

use super::{event_description, event_summary, CalendarError, CalendarProvider};
use crate::models::{Appointment, AppointmentRequest, AppointmentStatus, Language};
use crate::services::scheduling::BookedSlot;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar v3 over REST with a pre-issued OAuth bearer token.
pub struct GoogleCalendar {
    calendar_id: String,
    access_token: String,
    timezone: String,
    duration_minutes: i32,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(
        calendar_id: String,
        access_token: String,
        timezone: String,
        duration_minutes: i32,
    ) -> Self {
        Self {
            calendar_id,
            access_token,
            timezone,
            duration_minutes,
            base_url: API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    fn event_url(&self, id: &str) -> String {
        format!("{}/{}", self.events_url(), id)
    }

    fn event_body(&self, appointment: &Appointment) -> Value {
        json!({
            "summary": event_summary(appointment),
            "description": event_description(appointment),
            "start": {
                "dateTime": appointment.starts_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "timeZone": self.timezone,
            },
            "end": {
                "dateTime": appointment.ends_at().format("%Y-%m-%dT%H:%M:%S").to_string(),
                "timeZone": self.timezone,
            },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 24 * 60 },
                    { "method": "popup", "minutes": 30 },
                ],
            },
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value, CalendarError> {
        let resp = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("failed to call Google Calendar ({what})"))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CalendarError::NotFound(what.to_string()));
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let data: Value = resp
            .json()
            .await
            .context("failed to parse Google Calendar response")?;

        if !status.is_success() {
            return Err(CalendarError::Remote(format!("{status}: {data}")));
        }
        Ok(data)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn book(&self, request: &AppointmentRequest) -> Result<Appointment, CalendarError> {
        let now = Utc::now().naive_utc();
        let mut appointment = Appointment {
            id: String::new(),
            client_name: request.client_name.clone(),
            service: request.service.clone(),
            starts_at: request.starts_at(),
            duration_minutes: self.duration_minutes,
            email: request.email.clone(),
            phone: request.phone.clone(),
            language: request.language,
            status: AppointmentStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        let body = self.event_body(&appointment);
        let data = self
            .send(self.client.post(self.events_url()).json(&body), "insert event")
            .await?;

        appointment.id = data["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CalendarError::Remote("missing event id in response".to_string()))?;
        tracing::info!(id = %appointment.id, "calendar event created");
        Ok(appointment)
    }

    async fn cancel(&self, id: &str) -> Result<(), CalendarError> {
        self.send(self.client.delete(self.event_url(id)), id).await?;
        tracing::info!(id, "calendar event cancelled");
        Ok(())
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, CalendarError> {
        // The query window is in UTC; widen it by a day each side and filter
        // on the event's own local date.
        let time_min = format!("{}T00:00:00Z", date - Duration::days(1));
        let time_max = format!("{}T23:59:59Z", date + Duration::days(1));
        let request = self.client.get(self.events_url()).query(&[
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
        ]);
        let data = self.send(request, "list events").await?;

        Ok(data["items"]
            .as_array()
            .map(|items| items.iter().filter_map(booked_slot_from_event).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
            .filter(|slot| slot.starts_at.date() == date)
            .collect())
    }

    async fn event(&self, id: &str) -> Result<Option<Appointment>, CalendarError> {
        match self.send(self.client.get(self.event_url(id)), id).await {
            Ok(data) => Ok(appointment_from_event(&data, self.duration_minutes)),
            Err(CalendarError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn event_time(value: &Value) -> Option<NaiveDateTime> {
    let raw = value["dateTime"].as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn booked_slot_from_event(event: &Value) -> Option<BookedSlot> {
    let starts_at = event_time(&event["start"])?;
    let ends_at = event_time(&event["end"])?;
    Some(BookedSlot {
        starts_at,
        duration_minutes: (ends_at - starts_at).num_minutes(),
    })
}

/// Rebuilds an appointment from an event created by `book`. The summary is
/// `service - client`; events not in that shape keep the whole summary as
/// the service.
fn appointment_from_event(event: &Value, default_minutes: i32) -> Option<Appointment> {
    let id = event["id"].as_str()?.to_string();
    let slot = booked_slot_from_event(event)?;
    let summary = event["summary"].as_str().unwrap_or_default();
    let (service, client_name) = summary
        .split_once(" - ")
        .map(|(s, c)| (s.to_string(), c.to_string()))
        .unwrap_or_else(|| (summary.to_string(), String::new()));

    let status = match event["status"].as_str() {
        Some("cancelled") => AppointmentStatus::Cancelled,
        _ => AppointmentStatus::Confirmed,
    };
    let created_at = event["created"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.naive_utc())
        .unwrap_or(slot.starts_at);
    let duration_minutes = i32::try_from(slot.duration_minutes).unwrap_or(default_minutes);

    Some(Appointment {
        id,
        client_name,
        service,
        starts_at: slot.starts_at,
        duration_minutes,
        email: None,
        phone: None,
        language: Language::default(),
        status,
        created_at,
        updated_at: created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Value {
        json!({
            "id": "evt-1",
            "status": "confirmed",
            "summary": "manicure - Ana",
            "created": "2026-10-15T08:00:00.000Z",
            "start": { "dateTime": "2026-10-20T11:00:00+02:00", "timeZone": "Europe/Madrid" },
            "end": { "dateTime": "2026-10-20T12:00:00+02:00", "timeZone": "Europe/Madrid" }
        })
    }

    #[test]
    fn test_booked_slot_uses_local_time() {
        let slot = booked_slot_from_event(&event()).unwrap();
        assert_eq!(slot.starts_at.format("%Y-%m-%d %H:%M").to_string(), "2026-10-20 11:00");
        assert_eq!(slot.duration_minutes, 60);
    }

    #[test]
    fn test_all_day_events_are_skipped() {
        let all_day = json!({ "start": { "date": "2026-10-20" }, "end": { "date": "2026-10-21" } });
        assert!(booked_slot_from_event(&all_day).is_none());
    }

    #[test]
    fn test_appointment_from_event_splits_summary() {
        let appointment = appointment_from_event(&event(), 60).unwrap();
        assert_eq!(appointment.id, "evt-1");
        assert_eq!(appointment.service, "manicure");
        assert_eq!(appointment.client_name, "Ana");
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_event_body_has_timezone_and_reminders() {
        let calendar = GoogleCalendar::new(
            "primary".to_string(),
            "token".to_string(),
            "Europe/Madrid".to_string(),
            60,
        );
        let mut appointment = appointment_from_event(&event(), 60).unwrap();
        appointment.phone = Some("+34600000000".to_string());

        let body = calendar.event_body(&appointment);
        assert_eq!(body["start"]["dateTime"], "2026-10-20T11:00:00");
        assert_eq!(body["end"]["dateTime"], "2026-10-20T12:00:00");
        assert_eq!(body["start"]["timeZone"], "Europe/Madrid");
        assert_eq!(body["reminders"]["overrides"][0]["minutes"], 1440);
        assert_eq!(body["reminders"]["overrides"][1]["method"], "popup");
        assert_eq!(body["summary"], "manicure - Ana");
    }
}
