//! Dates, times and caller names pulled out of free text in English or
//! Spanish. Relative dates resolve against a reference day passed in by the
//! caller.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

// Day first, as written in Spain.
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}))?\b").unwrap());

static DAY_AFTER_TOMORROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:day after tomorrow|pasado mañana)\b").unwrap());

static TOMORROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(de la |por la |esta )?\b(tomorrow|mañana)\b").unwrap());

static TODAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:today|hoy)\b").unwrap());

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|lunes|martes|miércoles|miercoles|jueves|viernes|sábado|sabado|domingo)\b",
    )
    .unwrap()
});

static TWELVE_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*([ap])\.?\s?m\b").unwrap());

static SPANISH_HOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\ba las (\d{1,2})(?::([0-5]\d))?(?: y (media|cuarto))?(?: (?:de|por) la (mañana|tarde|noche))?",
    )
    .unwrap()
});

static TWENTY_FOUR_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

static NOON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:noon|mediodía|mediodia)\b").unwrap());

static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:my name is|mi nombre es|me llamo|call me|i'm|i am|soy)\s+([\p{L}]+)")
        .unwrap()
});

/// Words that follow "i'm" / "soy" without being a name.
const NOT_NAMES: &[&str] = &[
    "a", "an", "the", "looking", "interested", "calling", "trying", "wondering", "going", "here",
    "fine", "good", "not", "just", "sorry", "available", "free", "una", "un", "el", "la",
    "cliente", "nueva", "nuevo",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDateTime {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl ParsedDateTime {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

pub fn parse_date_time(text: &str, today: NaiveDate) -> ParsedDateTime {
    let text = text.to_lowercase();
    ParsedDateTime {
        date: extract_date(&text, today),
        time: extract_time(&text),
    }
}

/// Explicit dates first, then relative words, then weekday names. A weekday
/// resolves to its next occurrence, or to `today` when it is that day.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = SLASH_DATE.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => {
                let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
                if this_year < today {
                    NaiveDate::from_ymd_opt(today.year() + 1, month, day)
                } else {
                    Some(this_year)
                }
            }
        };
    }

    if DAY_AFTER_TOMORROW.is_match(text) {
        return Some(today + Duration::days(2));
    }

    // "de la mañana" is a time of day, not tomorrow.
    let tomorrow = TOMORROW
        .captures_iter(text)
        .any(|caps| caps.get(1).is_none());
    if tomorrow {
        return Some(today + Duration::days(1));
    }

    if TODAY.is_match(text) {
        return Some(today);
    }

    let weekday = WEEKDAY
        .captures(text)
        .and_then(|caps| parse_weekday(&caps[1]))?;
    Some(next_weekday(today, weekday))
}

pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let from = today.weekday().num_days_from_monday() as i64;
    let to = weekday.num_days_from_monday() as i64;
    today + Duration::days((to - from).rem_euclid(7))
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "monday" | "lunes" => Weekday::Mon,
        "tuesday" | "martes" => Weekday::Tue,
        "wednesday" | "miércoles" | "miercoles" => Weekday::Wed,
        "thursday" | "jueves" => Weekday::Thu,
        "friday" | "viernes" => Weekday::Fri,
        "saturday" | "sábado" | "sabado" => Weekday::Sat,
        "sunday" | "domingo" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// `2 pm`, `2:30 p.m.`, `a las 3 y media de la tarde`, `14:30` or `noon`.
pub fn extract_time(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = TWELVE_HOUR.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let hour = match (&caps[3], hour) {
            ("a", 12) => 0,
            ("a", h) => h,
            (_, 12) => 12,
            (_, h) => h + 12,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = SPANISH_HOUR.captures(text) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let mut minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        match caps.get(3).map(|m| m.as_str()) {
            Some("media") => minute = 30,
            Some("cuarto") => minute = 15,
            _ => {}
        }
        match (caps.get(4).map(|m| m.as_str()), hour) {
            // "las 12 de la noche" is midnight
            (Some("noche"), 12) => hour = 0,
            (Some("tarde" | "noche"), h) if h < 12 => hour += 12,
            _ => {}
        }
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = TWENTY_FOUR_HOUR.captures(text) {
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if NOON.is_match(text) {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }

    None
}

/// First name introduced with "my name is", "me llamo", "call me" and the
/// like, capitalised.
pub fn extract_name(text: &str) -> Option<String> {
    NAME.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|word| !NOT_NAMES.contains(&word.to_lowercase().as_str()))
        .map(capitalize)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}
