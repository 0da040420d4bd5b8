use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::services::datetime;
use crate::services::nlu::entities::{first_term, SERVICE_SEARCH_TERMS};
use crate::services::nlu::normalize;

static UNSPEAKABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?¿¡:'-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans a response for text-to-speech: spells out the euro sign, drops
/// symbols the synthesiser would read literally and collapses whitespace.
/// Accented letters are kept.
pub fn format_for_speech(text: &str) -> String {
    let text = text.replace('€', " euros");
    let text = UNSPEAKABLE.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Booking details collected over a phone call. Each utterance may fill in
/// some of them; later values overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingAppointment {
    pub client_name: Option<String>,
    pub service: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub phone: Option<String>,
}

/// The next thing to ask the caller for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Name,
    Service,
    Date,
    Time,
}

impl PendingAppointment {
    /// Pulls whatever details `utterance` contains and merges them in.
    pub fn absorb(&mut self, utterance: &str, today: NaiveDate) {
        let details = parse_appointment_utterance(utterance, today);
        if details.client_name.is_some() {
            self.client_name = details.client_name;
        }
        if details.service.is_some() {
            self.service = details.service;
        }
        if details.date.is_some() {
            self.date = details.date;
        }
        if details.time.is_some() {
            self.time = details.time;
        }
    }

    pub fn missing(&self) -> Option<MissingField> {
        if self.service.is_none() {
            Some(MissingField::Service)
        } else if self.date.is_none() {
            Some(MissingField::Date)
        } else if self.time.is_none() {
            Some(MissingField::Time)
        } else if self.client_name.is_none() {
            Some(MissingField::Name)
        } else {
            None
        }
    }
}

/// Calls abandoned without a status callback are dropped after this long.
pub const PENDING_CALL_TTL: Duration = Duration::from_secs(30 * 60);

/// Booking details per in-progress call, keyed by Twilio `CallSid`.
pub struct PendingCalls {
    ttl: Duration,
    calls: Mutex<HashMap<String, (Instant, PendingAppointment)>>,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::with_ttl(PENDING_CALL_TTL)
    }
}

impl PendingCalls {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Removes and returns the call's details, or an empty booking if the
    /// call is unknown or expired.
    pub fn take(&self, call_sid: &str) -> PendingAppointment {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        match calls.remove(call_sid) {
            Some((touched, pending)) if touched.elapsed() < self.ttl => pending,
            _ => PendingAppointment::default(),
        }
    }

    /// Stores the call's details. Calls without a `CallSid` are not tracked.
    pub fn remember(&self, call_sid: &str, pending: PendingAppointment) {
        if call_sid.is_empty() {
            return;
        }
        let now = Instant::now();
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.retain(|_, (touched, _)| now.duration_since(*touched) < self.ttl);
        calls.insert(call_sid.to_string(), (now, pending));
    }

    pub fn forget(&self, call_sid: &str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(call_sid);
    }

    pub fn get(&self, call_sid: &str) -> Option<PendingAppointment> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(call_sid)
            .map(|(_, pending)| pending.clone())
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Name, service, date and time mentioned in one utterance.
pub fn parse_appointment_utterance(text: &str, today: NaiveDate) -> PendingAppointment {
    let normalized = normalize(text);
    let parsed = datetime::parse_date_time(&normalized, today);
    PendingAppointment {
        client_name: datetime::extract_name(text.trim()),
        service: first_term(SERVICE_SEARCH_TERMS, &normalized).map(|(service, _)| service.to_string()),
        date: parsed.date,
        time: parsed.time,
        phone: None,
    }
}
