use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use super::{CalendarError, CalendarProvider};
use crate::db::queries;
use crate::models::{Appointment, AppointmentRequest, AppointmentStatus};
use crate::services::scheduling::BookedSlot;

/// Appointments kept in the service's own SQLite database.
pub struct LocalCalendar {
    db: Arc<Mutex<Connection>>,
    duration_minutes: i32,
}

impl LocalCalendar {
    pub fn new(db: Arc<Mutex<Connection>>, duration_minutes: i32) -> Self {
        Self {
            db,
            duration_minutes,
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CalendarError> {
        self.db
            .lock()
            .map_err(|_| CalendarError::Storage(anyhow::anyhow!("database lock poisoned")))
    }
}

#[async_trait]
impl CalendarProvider for LocalCalendar {
    async fn book(&self, request: &AppointmentRequest) -> Result<Appointment, CalendarError> {
        let now = Utc::now().naive_utc();
        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
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

        queries::create_appointment(&*self.conn()?, &appointment)?;
        tracing::info!(id = %appointment.id, starts_at = %appointment.starts_at, "appointment stored");
        Ok(appointment)
    }

    async fn cancel(&self, id: &str) -> Result<(), CalendarError> {
        let updated = queries::update_appointment_status(&*self.conn()?, id, AppointmentStatus::Cancelled)?;
        if !updated {
            return Err(CalendarError::NotFound(id.to_string()));
        }
        tracing::info!(id, "appointment cancelled");
        Ok(())
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, CalendarError> {
        let appointments = queries::get_appointments_on(&*self.conn()?, date)?;
        Ok(appointments
            .into_iter()
            .map(|a| BookedSlot {
                starts_at: a.starts_at,
                duration_minutes: a.duration_minutes as i64,
            })
            .collect())
    }

    async fn event(&self, id: &str) -> Result<Option<Appointment>, CalendarError> {
        Ok(queries::get_appointment_by_id(&*self.conn()?, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Language;
    use chrono::NaiveTime;

    fn calendar() -> LocalCalendar {
        let conn = db::init_db(":memory:").unwrap();
        LocalCalendar::new(Arc::new(Mutex::new(conn)), 60)
    }

    fn request() -> AppointmentRequest {
        AppointmentRequest {
            client_name: "Marta".to_string(),
            service: "pedicure".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            email: None,
            phone: Some("+34600111222".to_string()),
            language: Language::Es,
        }
    }

    #[tokio::test]
    async fn test_book_then_fetch() {
        let calendar = calendar();
        let booked = calendar.book(&request()).await.unwrap();
        assert_eq!(booked.duration_minutes, 60);

        let fetched = calendar.event(&booked.id).await.unwrap().unwrap();
        assert_eq!(fetched.client_name, "Marta");
        assert_eq!(fetched.phone.as_deref(), Some("+34600111222"));

        let slots = calendar.booked_slots(request().date).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].starts_at, request().starts_at());
    }

    #[tokio::test]
    async fn test_cancel_frees_slot() {
        let calendar = calendar();
        let booked = calendar.book(&request()).await.unwrap();
        calendar.cancel(&booked.id).await.unwrap();
        assert!(calendar.booked_slots(request().date).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_unknown_is_not_found() {
        let err = calendar().cancel("missing").await.unwrap_err();
        assert!(matches!(err, CalendarError::NotFound(_)));
    }
}
