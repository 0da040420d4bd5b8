use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::knowledge::Schedule;

/// Opening and closing time for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for OpeningWindow {
    /// Used when the schedule does not say anything about a day.
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl OpeningWindow {
    /// Parses ranges such as `9:30 AM - 8:30 PM` or `10:00-18:00`.
    /// `Closed` yields `Ok(None)`.
    pub fn parse(range: &str) -> anyhow::Result<Option<Self>> {
        let range = range.trim();
        if range.eq_ignore_ascii_case("closed") || range.eq_ignore_ascii_case("cerrado") {
            return Ok(None);
        }

        let (open, close) = range
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("invalid opening hours: {range}"))?;
        let open = parse_clock(open)?;
        let close = parse_clock(close)?;
        if close <= open {
            return Err(anyhow::anyhow!("closing time before opening time: {range}"));
        }
        Ok(Some(Self { open, close }))
    }

    /// Whether `[start, start + duration)` fits inside the window.
    pub fn fits(&self, start: NaiveTime, duration_minutes: i64) -> bool {
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes));
        wrapped == 0 && start >= self.open && end <= self.close
    }

    /// Slot start times every `step_minutes`, each slot ending by closing time.
    pub fn slots(&self, step_minutes: i64) -> Vec<NaiveTime> {
        let mut slots = Vec::new();
        if step_minutes <= 0 {
            return slots;
        }
        let mut current = self.open;
        while self.fits(current, step_minutes) {
            slots.push(current);
            current += Duration::minutes(step_minutes);
        }
        slots
    }

    pub fn to_human_readable(&self) -> String {
        format!("{}-{}", self.open.format("%H:%M"), self.close.format("%H:%M"))
    }
}

/// Opening window for `date`: `None` when the salon is closed that day, the
/// default window when the schedule has no usable entry for it.
pub fn window_for(schedule: &Schedule, date: NaiveDate) -> Option<OpeningWindow> {
    let Some(range) = schedule.hours_for(date.weekday()) else {
        return Some(OpeningWindow::default());
    };

    match OpeningWindow::parse(range) {
        Ok(window) => window,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable business hours, using defaults");
            Some(OpeningWindow::default())
        }
    }
}

pub fn is_open_at(schedule: &Schedule, dt: &NaiveDateTime, duration_minutes: i64) -> bool {
    window_for(schedule, dt.date())
        .map(|window| window.fits(dt.time(), duration_minutes))
        .unwrap_or(false)
}

/// `9:30 AM`, `9 pm`, `14:00` or `9:30am`.
pub fn parse_clock(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim().to_lowercase();
    let (clock, meridiem) = if let Some(rest) = s.strip_suffix("am") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = s.strip_suffix("pm") {
        (rest.trim(), Some(true))
    } else {
        (s.as_str(), None)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h, m),
        None => (clock, "0"),
    };
    let mut hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;

    if let Some(pm) = meridiem {
        if hour == 0 || hour > 12 {
            return Err(anyhow::anyhow!("invalid 12-hour time: {s}"));
        }
        hour = match (pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule() -> Schedule {
        serde_json::from_str(
            r#"{"business_hours":{"monday":"9:30 AM - 8:30 PM","saturday":"9:30 AM - 2:30 PM","sunday":"Closed","tuesday":"whenever"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_clock("9:30 AM").unwrap(), t(9, 30));
        assert_eq!(parse_clock("8:30 PM").unwrap(), t(20, 30));
        assert_eq!(parse_clock("12 pm").unwrap(), t(12, 0));
        assert_eq!(parse_clock("12:15am").unwrap(), t(0, 15));
        assert_eq!(parse_clock("14:00").unwrap(), t(14, 0));
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("13 pm").is_err());
        assert!(parse_clock("noon").is_err());
    }

    #[test]
    fn test_parse_window() {
        let window = OpeningWindow::parse("9:30 AM - 8:30 PM").unwrap().unwrap();
        assert_eq!(window.open, t(9, 30));
        assert_eq!(window.close, t(20, 30));
        assert_eq!(OpeningWindow::parse("Closed").unwrap(), None);
        assert!(OpeningWindow::parse("18:00-10:00").is_err());
    }

    #[test]
    fn test_default_slots() {
        let slots = OpeningWindow::default().slots(30);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first(), Some(&t(10, 0)));
        assert_eq!(slots.last(), Some(&t(17, 30)));
    }

    #[test]
    fn test_window_for_weekdays() {
        let schedule = schedule();
        // 2026-10-19 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(window_for(&schedule, monday).unwrap().open, t(9, 30));
        // Sunday is closed
        assert_eq!(window_for(&schedule, monday + Duration::days(6)), None);
        // Tuesday is unreadable, Wednesday is absent: both default
        assert_eq!(
            window_for(&schedule, monday + Duration::days(1)),
            Some(OpeningWindow::default())
        );
        assert_eq!(
            window_for(&schedule, monday + Duration::days(2)),
            Some(OpeningWindow::default())
        );
    }

    #[test]
    fn test_is_open_at() {
        let schedule = schedule();
        // 2026-10-24 is a Saturday
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        assert!(is_open_at(&schedule, &saturday.and_time(t(13, 30)), 60));
        assert!(!is_open_at(&schedule, &saturday.and_time(t(14, 0)), 60));
        assert!(!is_open_at(&schedule, &saturday.and_time(t(9, 0)), 30));
    }

    #[test]
    fn test_fits_does_not_wrap_midnight() {
        let window = OpeningWindow {
            open: t(0, 0),
            close: t(23, 59),
        };
        assert!(!window.fits(t(23, 30), 60));
    }
}
