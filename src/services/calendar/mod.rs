pub mod google;
pub mod local;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::models::{Appointment, AppointmentRequest, Schedule};
use crate::services::scheduling::{validate_booking_time, BookedSlot, SchedulingError};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("appointment not found: {0}")]
    NotFound(String),

    #[error("calendar storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("calendar API error: {0}")]
    Remote(String),

    #[error(transparent)]
    Unavailable(#[from] SchedulingError),
}

/// Where appointments end up. Booking is the only side effect the assistant
/// triggers.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn book(&self, request: &AppointmentRequest) -> Result<Appointment, CalendarError>;

    async fn cancel(&self, id: &str) -> Result<(), CalendarError>;

    async fn booked_slots(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, CalendarError>;

    async fn event(&self, id: &str) -> Result<Option<Appointment>, CalendarError>;
}

/// Books `request` only if it falls within business hours and does not
/// overlap an existing appointment. `booking_lock` is held from the
/// availability check until the insert, so concurrent bookings for the same
/// slot cannot both pass the check.
pub async fn book_if_available(
    calendar: &dyn CalendarProvider,
    booking_lock: &Mutex<()>,
    schedule: &Schedule,
    request: &AppointmentRequest,
    duration_minutes: i64,
) -> Result<Appointment, CalendarError> {
    let _guard = booking_lock.lock().await;
    let booked = calendar.booked_slots(request.date).await?;
    validate_booking_time(schedule, request.starts_at(), duration_minutes, &booked)?;
    calendar.book(request).await
}

pub fn event_summary(appointment: &Appointment) -> String {
    format!("{} - {}", appointment.service, appointment.client_name)
}

pub fn event_description(appointment: &Appointment) -> String {
    format!(
        "Appointment for {}\nClient: {}\nPhone: {}\nEmail: {}",
        appointment.service,
        appointment.client_name,
        appointment.phone.as_deref().unwrap_or("-"),
        appointment.email.as_deref().unwrap_or("-"),
    )
}

/// iCalendar file for one appointment. Times are local to `timezone`.
pub fn generate_ics(appointment: &Appointment, business_name: &str, timezone: &str) -> String {
    let dtstart = appointment.starts_at.format("%Y%m%dT%H%M%S").to_string();
    let dtend = appointment.ends_at().format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = appointment.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@salon-assistant", appointment.id);
    let summary = format!("{} at {}", event_summary(appointment), business_name);
    let description = event_description(appointment).replace('\n', "\\n");

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Salon Assistant//Appointments//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART;TZID={timezone}:{dtstart}\r\n\
         DTEND;TZID={timezone}:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         BEGIN:VALARM\r\n\
         ACTION:DISPLAY\r\n\
         DESCRIPTION:{summary}\r\n\
         TRIGGER:-PT30M\r\n\
         END:VALARM\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}
