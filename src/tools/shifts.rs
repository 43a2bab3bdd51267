//! Shift MCP Tools
//!
//! Work-schedule logging with computed overtime.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Shift, ShiftCreate};

/// Response for register_shift
#[derive(Debug, Serialize)]
pub struct RegisterShiftResponse {
    pub id: i64,
    pub date: String,
    pub clock_in: String,
    pub clock_out: String,
    pub overtime_hours: f64,
}

/// Response for list_shifts
#[derive(Debug, Serialize)]
pub struct ListShiftsResponse {
    pub shifts: Vec<Shift>,
    pub count: usize,
}

/// Register a worked shift
pub fn register_shift(db: &Database, data: ShiftCreate) -> Result<RegisterShiftResponse, String> {
    if NaiveDate::parse_from_str(&data.date, "%Y-%m-%d").is_err() {
        return Err(format!("Invalid date (expected YYYY-MM-DD): {}", data.date));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let shift = Shift::create(&conn, &data)
        .map_err(|e| format!("Failed to register shift: {}", e))?
        .ok_or_else(|| {
            format!(
                "Invalid clock times (expected HH:MM): {} / {}",
                data.clock_in, data.clock_out
            )
        })?;

    Ok(RegisterShiftResponse {
        id: shift.id,
        date: shift.date,
        clock_in: shift.clock_in,
        clock_out: shift.clock_out,
        overtime_hours: shift.overtime_hours,
    })
}

/// List logged shifts, most recent first
pub fn list_shifts(db: &Database, limit: i64) -> Result<ListShiftsResponse, String> {
    let limit = limit.clamp(1, 500);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let shifts = Shift::list(&conn, limit)
        .map_err(|e| format!("Failed to list shifts: {}", e))?;

    let count = shifts.len();

    Ok(ListShiftsResponse { shifts, count })
}
