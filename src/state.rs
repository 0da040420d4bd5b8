use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::services::calendar::CalendarProvider;
use crate::services::nlu::NluEngine;
use crate::services::speech::PendingCalls;

pub struct AppState {
    pub config: AppConfig,
    pub nlu: Arc<NluEngine>,
    pub calendar: Box<dyn CalendarProvider>,
    /// Serialises availability check and insert across bookings.
    pub booking_lock: tokio::sync::Mutex<()>,
    /// Booking details gathered so far, per phone call.
    pub pending_calls: PendingCalls,
    /// Reference day for relative dates ("tomorrow", "el viernes").
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(config: AppConfig, nlu: Arc<NluEngine>, calendar: Box<dyn CalendarProvider>) -> Self {
        Self {
            config,
            nlu,
            calendar,
            booking_lock: tokio::sync::Mutex::new(()),
            pending_calls: PendingCalls::default(),
            today: local_today,
        }
    }
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
