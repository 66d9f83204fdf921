// src/factorial_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PENDING_STATE: &str = "pending";

// --- Attendance Periods ---

/// One employee's timesheet for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePeriod {
    pub id: u64,
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
    pub state: String,
}

impl AttendancePeriod {
    pub fn is_pending(&self) -> bool {
        self.state == PENDING_STATE
    }

    pub fn matches(&self, employee_id: u64, year: i32, month: u32) -> bool {
        self.employee_id == employee_id && self.year == year && self.month == month
    }
}

// --- Shifts ---

/// A shift as listed by `GET /attendance/shifts`. Only the fields needed to
/// decide on and describe a deletion are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: u64,
    #[serde(default)]
    pub period_id: Option<u64>,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub clock_in: Option<String>,
    #[serde(default)]
    pub clock_out: Option<String>,
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "?".to_string());
        write!(f, "{{ id: {}", self.id)?;
        if let Some(period_id) = self.period_id {
            write!(f, ", period_id: {}", period_id)?;
        }
        if let Some(day) = self.day {
            write!(f, ", day: {}", day)?;
        }
        write!(
            f,
            ", time: {{ clock_in: {}, clock_out: {} }} }}",
            opt(&self.clock_in),
            opt(&self.clock_out)
        )
    }
}

/// Body of `POST /attendance/shifts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShift {
    pub clock_in: String,
    pub clock_out: String,
    pub day: u32,
    pub history: Vec<serde_json::Value>,
    pub minutes: u32,
    pub observations: Option<String>,
    pub period_id: u64,
}

impl NewShift {
    pub fn new(period_id: u64, day: u32, clock_in: &str, clock_out: &str) -> Self {
        Self {
            clock_in: clock_in.to_string(),
            clock_out: clock_out.to_string(),
            day,
            history: Vec::new(),
            minutes: 0,
            observations: None,
            period_id,
        }
    }
}
