use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::availability::{is_open_at, window_for};
use crate::models::Schedule;

pub const SLOT_MINUTES: i64 = 30;

/// A block of time already taken in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSlot {
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i64,
}

impl BookedSlot {
    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at + Duration::minutes(self.duration_minutes)
    }

    fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.starts_at < end && self.ends_at() > start
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchedulingError {
    #[error("that time is outside our business hours ({hours})")]
    OutsideBusinessHours { hours: String },

    #[error("that time slot is already booked")]
    Conflict,
}

/// Half-hour slot starts on `date` within business hours that do not overlap
/// an existing booking. Empty on closed days.
pub fn available_times(schedule: &Schedule, date: NaiveDate, booked: &[BookedSlot]) -> Vec<NaiveTime> {
    let Some(window) = window_for(schedule, date) else {
        return Vec::new();
    };

    window
        .slots(SLOT_MINUTES)
        .into_iter()
        .filter(|slot| {
            let start = date.and_time(*slot);
            let end = start + Duration::minutes(SLOT_MINUTES);
            !booked.iter().any(|b| b.overlaps(start, end))
        })
        .collect()
}

pub fn validate_booking_time(
    schedule: &Schedule,
    start: NaiveDateTime,
    duration_minutes: i64,
    booked: &[BookedSlot],
) -> Result<(), SchedulingError> {
    if !is_open_at(schedule, &start, duration_minutes) {
        let hours = window_for(schedule, start.date())
            .map(|w| w.to_human_readable())
            .unwrap_or_else(|| "closed".to_string());
        return Err(SchedulingError::OutsideBusinessHours { hours });
    }

    let end = start + Duration::minutes(duration_minutes);
    if booked.iter().any(|b| b.overlaps(start, end)) {
        return Err(SchedulingError::Conflict);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn schedule() -> Schedule {
        serde_json::from_str(
            r#"{"business_hours":{"monday":"9:30 AM - 12:00 PM","sunday":"Closed"}}"#,
        )
        .unwrap()
    }

    // 2026-10-19 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_available_times_skip_booked_slots() {
        let booked = [BookedSlot {
            starts_at: at(monday(), 10, 0),
            duration_minutes: 60,
        }];
        let times: Vec<String> = available_times(&schedule(), monday(), &booked)
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect();
        assert_eq!(times, vec!["09:30", "11:00", "11:30"]);
    }

    #[test]
    fn test_closed_day_has_no_times() {
        let sunday = monday() + Duration::days(6);
        assert!(available_times(&schedule(), sunday, &[]).is_empty());
    }

    #[test]
    fn test_unknown_day_uses_default_hours() {
        let tuesday = monday() + Duration::days(1);
        assert_eq!(available_times(&Schedule::default(), tuesday, &[]).len(), 16);
    }

    #[test]
    fn test_validate_outside_hours() {
        let err = validate_booking_time(&schedule(), at(monday(), 11, 30), 60, &[]).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::OutsideBusinessHours {
                hours: "09:30-12:00".to_string()
            }
        );
    }

    #[test]
    fn test_validate_conflict() {
        let booked = [BookedSlot {
            starts_at: at(monday(), 10, 0),
            duration_minutes: 60,
        }];
        assert_eq!(
            validate_booking_time(&schedule(), at(monday(), 10, 30), 60, &booked),
            Err(SchedulingError::Conflict)
        );
        assert!(validate_booking_time(&schedule(), at(monday(), 11, 0), 60, &booked).is_ok());
    }
}
