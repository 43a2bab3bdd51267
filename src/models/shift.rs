//! Shift model
//!
//! Work-schedule log entries with overtime computed at registration.

use chrono::NaiveTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Hours in a standard shift; anything beyond counts as overtime
pub const STANDARD_SHIFT_HOURS: f64 = 8.0;

/// A logged work shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: i64,
    pub date: String,
    pub clock_in: String,
    pub clock_out: String,
    pub overtime_hours: f64,
    pub created_at: String,
}

/// Data for registering a shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCreate {
    /// ISO date: "2025-01-09"
    pub date: String,
    /// "HH:MM"
    pub clock_in: String,
    /// "HH:MM"
    pub clock_out: String,
}

/// Hours worked between two "HH:MM" times
///
/// A clock-out earlier than clock-in is treated as crossing midnight.
pub fn hours_worked(clock_in: &str, clock_out: &str) -> Option<f64> {
    let start = NaiveTime::parse_from_str(clock_in, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(clock_out, "%H:%M").ok()?;

    let mut minutes = (end - start).num_minutes();
    if minutes < 0 {
        minutes += 24 * 60;
    }

    Some(minutes as f64 / 60.0)
}

/// Overtime hours for a shift
pub fn overtime_hours(clock_in: &str, clock_out: &str) -> Option<f64> {
    hours_worked(clock_in, clock_out).map(|worked| (worked - STANDARD_SHIFT_HOURS).max(0.0))
}

impl Shift {
    /// Create a Shift from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            clock_in: row.get("clock_in")?,
            clock_out: row.get("clock_out")?,
            overtime_hours: row.get("overtime_hours")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Register a shift, computing its overtime
    ///
    /// Returns Ok(None) when the times do not parse as "HH:MM".
    pub fn create(conn: &Connection, data: &ShiftCreate) -> DbResult<Option<Self>> {
        let Some(overtime) = overtime_hours(&data.clock_in, &data.clock_out) else {
            return Ok(None);
        };

        conn.execute(
            r#"
            INSERT INTO shifts (date, clock_in, clock_out, overtime_hours)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.date, data.clock_in, data.clock_out, overtime],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM shifts WHERE id = ?1")?;
        let shift = stmt.query_row([id], Self::from_row)?;
        Ok(Some(shift))
    }

    /// List shifts, most recent date first
    pub fn list(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM shifts ORDER BY date DESC, id DESC LIMIT ?1")?;

        let shifts = stmt
            .query_map([limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(shifts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_worked() {
        assert_eq!(hours_worked("09:00", "17:00"), Some(8.0));
        assert_eq!(hours_worked("09:00", "17:30"), Some(8.5));
        assert_eq!(hours_worked("bad", "17:00"), None);
    }

    #[test]
    fn test_hours_worked_overnight() {
        assert_eq!(hours_worked("22:00", "06:00"), Some(8.0));
    }

    #[test]
    fn test_overtime() {
        assert_eq!(overtime_hours("09:00", "17:00"), Some(0.0));
        assert_eq!(overtime_hours("09:00", "19:00"), Some(2.0));
        assert_eq!(overtime_hours("09:00", "12:00"), Some(0.0));
    }
}
