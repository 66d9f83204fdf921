// src/calendar.rs

use chrono::{Datelike, Local, NaiveDate, Utc, Weekday};
use std::collections::BTreeSet;

// --- Date Source ---

/// Where "today" comes from. Production uses the local clock, tests pin a date.
pub trait DateSource: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn utc_year(&self) -> i32 {
        self.today().year()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDateSource;

impl DateSource for SystemDateSource {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn utc_year(&self) -> i32 {
        Utc::now().year()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDateSource {
    date: NaiveDate,
}

impl FixedDateSource {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Panics on an impossible date; intended for tests and fixtures.
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid fixed date {}-{}-{}", year, month, day));
        Self { date }
    }
}

impl DateSource for FixedDateSource {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

// --- Month Arithmetic ---

/// Number of days in `month` of `year`, or `None` for an out-of-range month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

pub fn is_weekday(year: i32, month: u32, day: u32) -> bool {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        None => false,
    }
}

/// Last day of the month that may be posted to.
///
/// For the month `today` falls in this is today's day-of-month, so future days
/// are never filled; any other month is covered in full.
pub fn last_postable_day(year: i32, month: u32, today: NaiveDate) -> Option<u32> {
    let total = days_in_month(year, month)?;
    if today.year() == year && today.month() == month {
        Some(today.day().min(total))
    } else {
        Some(total)
    }
}

/// Ascending days-of-month that get shifts: weekdays up to the postable bound,
/// minus holidays.
pub fn working_days(
    year: i32,
    month: u32,
    today: NaiveDate,
    holidays: &BTreeSet<u32>,
) -> Vec<u32> {
    let Some(last) = last_postable_day(year, month, today) else {
        return Vec::new();
    };
    (1..=last)
        .filter(|&day| is_weekday(year, month, day))
        .filter(|day| !holidays.contains(day))
        .collect()
}
