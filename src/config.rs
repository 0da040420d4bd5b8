use std::env;

use crate::models::Language;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalendarBackend {
    Local,
    Google,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: String,
    pub database_url: String,
    pub default_language: Language,
    pub business_name: String,
    pub public_url: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub calendar_backend: CalendarBackend,
    pub google_calendar_id: String,
    pub google_access_token: String,
    pub calendar_timezone: String,
    pub appointment_minutes: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: "data".to_string(),
            database_url: "bookings.db".to_string(),
            default_language: Language::En,
            business_name: "Hera's Nails and Lashes".to_string(),
            public_url: String::new(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            calendar_backend: CalendarBackend::Local,
            google_calendar_id: "primary".to_string(),
            google_access_token: String::new(),
            calendar_timezone: "Europe/Madrid".to_string(),
            appointment_minutes: 60,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            default_language: env::var("DEFAULT_LANGUAGE")
                .map(|v| Language::parse(&v))
                .unwrap_or(defaults.default_language),
            business_name: env::var("BUSINESS_NAME").unwrap_or(defaults.business_name),
            public_url: env::var("PUBLIC_URL").unwrap_or_default(),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            calendar_backend: match env::var("CALENDAR_PROVIDER").as_deref() {
                Ok("google") => CalendarBackend::Google,
                _ => CalendarBackend::Local,
            },
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or(defaults.google_calendar_id),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default(),
            calendar_timezone: env::var("CALENDAR_TIMEZONE")
                .unwrap_or(defaults.calendar_timezone),
            appointment_minutes: env::var("APPOINTMENT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(defaults.appointment_minutes),
        }
    }
}
