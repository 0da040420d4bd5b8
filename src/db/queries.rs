use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Appointment, AppointmentStatus, Language};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, client_name, service, starts_at, duration_minutes, email, phone, language, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appointment.id,
            appointment.client_name,
            appointment.service,
            appointment.starts_at.format(DATETIME_FORMAT).to_string(),
            appointment.duration_minutes,
            appointment.email,
            appointment.phone,
            appointment.language.as_str(),
            appointment.status.as_str(),
            appointment.created_at.format(DATETIME_FORMAT).to_string(),
            appointment.updated_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, client_name, service, starts_at, duration_minutes, email, phone, language, status, created_at, updated_at \
         FROM appointments WHERE id = ?1",
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Confirmed appointments starting on `date`, earliest first.
pub fn get_appointments_on(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Appointment>> {
    let start = date.and_time(NaiveTime::MIN).format(DATETIME_FORMAT).to_string();
    let end = date
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| start.clone());

    let mut stmt = conn.prepare(
        "SELECT id, client_name, service, starts_at, duration_minutes, email, phone, language, status, created_at, updated_at
         FROM appointments WHERE starts_at >= ?1 AND starts_at <= ?2 AND status != 'cancelled' ORDER BY starts_at ASC",
    )?;

    let rows = stmt.query_map(params![start, end], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(DATETIME_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let client_name: String = row.get(1)?;
    let service: String = row.get(2)?;
    let starts_at_str: String = row.get(3)?;
    let duration_minutes: i32 = row.get(4)?;
    let email: Option<String> = row.get(5)?;
    let phone: Option<String> = row.get(6)?;
    let language_str: String = row.get(7)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    let starts_at = NaiveDateTime::parse_from_str(&starts_at_str, DATETIME_FORMAT)?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, DATETIME_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, DATETIME_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Appointment {
        id,
        client_name,
        service,
        starts_at,
        duration_minutes,
        email,
        phone,
        language: Language::parse(&language_str),
        status: AppointmentStatus::parse(&status_str),
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn appointment(id: &str, starts_at: &str) -> Appointment {
        let now = Utc::now().naive_utc();
        Appointment {
            id: id.to_string(),
            client_name: "Lucía".to_string(),
            service: "manicure".to_string(),
            starts_at: NaiveDateTime::parse_from_str(starts_at, DATETIME_FORMAT).unwrap(),
            duration_minutes: 60,
            email: Some("lucia@example.com".to_string()),
            phone: None,
            language: Language::Es,
            status: AppointmentStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_and_fetch_appointment() {
        let conn = db::init_db(":memory:").unwrap();
        create_appointment(&conn, &appointment("a1", "2026-10-20 10:00:00")).unwrap();

        let fetched = get_appointment_by_id(&conn, "a1").unwrap().unwrap();
        assert_eq!(fetched.client_name, "Lucía");
        assert_eq!(fetched.language, Language::Es);
        assert_eq!(fetched.email.as_deref(), Some("lucia@example.com"));
        assert!(get_appointment_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_appointments_on_date_skips_cancelled_and_other_days() {
        let conn = db::init_db(":memory:").unwrap();
        create_appointment(&conn, &appointment("a1", "2026-10-20 12:00:00")).unwrap();
        create_appointment(&conn, &appointment("a2", "2026-10-20 10:30:00")).unwrap();
        create_appointment(&conn, &appointment("a3", "2026-10-21 10:00:00")).unwrap();
        create_appointment(&conn, &appointment("a4", "2026-10-20 16:00:00")).unwrap();
        assert!(update_appointment_status(&conn, "a4", AppointmentStatus::Cancelled).unwrap());

        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let ids: Vec<String> = get_appointments_on(&conn, date)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["a2", "a1"]);
    }

    #[test]
    fn test_cancel_unknown_appointment() {
        let conn = db::init_db(":memory:").unwrap();
        assert!(!update_appointment_status(&conn, "nope", AppointmentStatus::Cancelled).unwrap());
    }
}
