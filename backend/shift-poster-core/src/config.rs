// src/config.rs

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.factorialhr.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Accepts both "9:00" and "09:00".
const TIME_FORMAT: &str = "%H:%M";

// --- Config Errors ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid clock format: at least one clock segment is required (e.g. 9:00-13:00)")]
    EmptyClock,

    #[error("Invalid clock format: segment {index} has an invalid {field} '{value}' (expected HH:MM)")]
    InvalidTime {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("Invalid clock format: segment {index} clocks in at {clock_in} but out at {clock_out}")]
    SegmentOrder {
        index: usize,
        clock_in: String,
        clock_out: String,
    },

    #[error("Invalid clock format: '{0}' is not of the form IN-OUT (e.g. 9:00-13:00)")]
    InvalidSegmentSyntax(String),

    #[error("Invalid clock format: {0}")]
    ClockJson(String),

    #[error("Invalid month {0}: expected 1..=12")]
    InvalidMonth(u32),

    #[error("Invalid holiday {0}: expected a day of month within 1..=31")]
    InvalidHoliday(u32),
}

// --- Clock Segments ---

/// One working block of a day, e.g. the morning before lunch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSegment {
    pub clock_in: String,
    pub clock_out: String,
}

impl ClockSegment {
    pub fn new(clock_in: impl Into<String>, clock_out: impl Into<String>) -> Self {
        Self {
            clock_in: clock_in.into(),
            clock_out: clock_out.into(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let parse = |field: &'static str, value: &str| {
            NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
                ConfigError::InvalidTime {
                    index,
                    field,
                    value: value.to_string(),
                }
            })
        };
        let clock_in = parse("clock_in", &self.clock_in)?;
        let clock_out = parse("clock_out", &self.clock_out)?;
        if clock_in >= clock_out {
            return Err(ConfigError::SegmentOrder {
                index,
                clock_in: self.clock_in.clone(),
                clock_out: self.clock_out.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ClockSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.clock_in, self.clock_out)
    }
}

impl FromStr for ClockSegment {
    type Err = ConfigError;

    /// Parses the `IN-OUT` form used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((clock_in, clock_out))
                if !clock_in.trim().is_empty() && !clock_out.trim().is_empty() =>
            {
                Ok(Self::new(clock_in.trim(), clock_out.trim()))
            }
            _ => Err(ConfigError::InvalidSegmentSyntax(s.to_string())),
        }
    }
}

pub fn default_clock() -> Vec<ClockSegment> {
    vec![
        ClockSegment::new("9:00", "13:00"),
        ClockSegment::new("14:00", "18:00"),
    ]
}

/// Parses a JSON array of `{clock_in, clock_out}` records.
pub fn parse_clock_json(raw: &str) -> Result<Vec<ClockSegment>, ConfigError> {
    serde_json::from_str::<Vec<ClockSegment>>(raw)
        .map_err(|e| ConfigError::ClockJson(e.to_string()))
}

// --- Run Configuration ---

/// Everything one run needs to know about whose month to fill and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPosterConfig {
    pub year: i32,
    pub month: u32,
    pub employee_id: u64,
    pub clock: Vec<ClockSegment>,
    pub holidays: BTreeSet<u32>,
}

impl ShiftPosterConfig {
    /// Resolves defaults against `today` and validates the result.
    ///
    /// A missing year falls back to the current UTC year and a missing month
    /// to the current local month; `today` is whatever the caller treats as
    /// the local date. `None` for `clock` selects [`default_clock`], while an
    /// explicitly empty clock is rejected.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        employee_id: u64,
        clock: Option<Vec<ClockSegment>>,
        holidays: impl IntoIterator<Item = u32>,
        utc_year: i32,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            year: year.unwrap_or(utc_year),
            month: month.unwrap_or_else(|| today.month()),
            employee_id,
            clock: clock.unwrap_or_else(default_clock),
            holidays: holidays.into_iter().collect(),
        };
        config.validate()?;
        config.log_clock();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=12).contains(&self.month) {
            return Err(ConfigError::InvalidMonth(self.month));
        }
        if self.clock.is_empty() {
            return Err(ConfigError::EmptyClock);
        }
        for (index, segment) in self.clock.iter().enumerate() {
            segment.validate(index)?;
        }
        if let Some(&day) = self.holidays.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(ConfigError::InvalidHoliday(day));
        }
        Ok(())
    }

    fn log_clock(&self) {
        for segment in &self.clock {
            info!("clock_in: {}", segment.clock_in);
            info!("clock_out: {}", segment.clock_out);
        }
    }
}

// --- API Configuration (environment) ---

/// Connection settings read from `FACTORIAL_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Value of the `Cookie` header of an already-authenticated browser session.
    pub session_cookie: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        envy::prefixed("FACTORIAL_").from_env::<ApiConfig>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 11, 20).unwrap()
    }

    #[test]
    fn defaults_fill_in_missing_fields() {
        let config =
            ShiftPosterConfig::resolve(None, None, 42, None, Vec::new(), 2019, today()).unwrap();
        assert_eq!(config.year, 2019);
        assert_eq!(config.month, 11);
        assert_eq!(config.employee_id, 42);
        assert_eq!(config.clock, default_clock());
        assert!(config.holidays.is_empty());
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let clock = vec![ClockSegment::new("08:30", "16:30")];
        let config = ShiftPosterConfig::resolve(
            Some(2020),
            Some(2),
            7,
            Some(clock.clone()),
            vec![5, 4, 5],
            2019,
            today(),
        )
        .unwrap();
        assert_eq!(config.year, 2020);
        assert_eq!(config.month, 2);
        assert_eq!(config.clock, clock);
        assert_eq!(config.holidays.into_iter().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn empty_clock_is_rejected() {
        let result =
            ShiftPosterConfig::resolve(None, None, 1, Some(Vec::new()), Vec::new(), 2019, today());
        assert_eq!(result, Err(ConfigError::EmptyClock));
    }

    #[test]
    fn malformed_times_are_rejected_with_their_position() {
        let clock = vec![
            ClockSegment::new("9:00", "13:00"),
            ClockSegment::new("14:00", "late"),
        ];
        let result =
            ShiftPosterConfig::resolve(None, None, 1, Some(clock), Vec::new(), 2019, today());
        assert_eq!(
            result,
            Err(ConfigError::InvalidTime {
                index: 1,
                field: "clock_out",
                value: "late".to_string(),
            })
        );
    }

    #[test]
    fn segment_must_end_after_it_starts() {
        let clock = vec![ClockSegment::new("13:00", "9:00")];
        let err = ShiftPosterConfig::resolve(None, None, 1, Some(clock), Vec::new(), 2019, today())
            .unwrap_err();
        assert!(matches!(err, ConfigError::SegmentOrder { index: 0, .. }));
    }

    #[test]
    fn month_and_holiday_ranges_are_checked() {
        assert_eq!(
            ShiftPosterConfig::resolve(None, Some(13), 1, None, Vec::new(), 2019, today()),
            Err(ConfigError::InvalidMonth(13))
        );
        assert_eq!(
            ShiftPosterConfig::resolve(None, None, 1, None, vec![0], 2019, today()),
            Err(ConfigError::InvalidHoliday(0))
        );
    }

    #[test]
    fn segment_parses_from_cli_form() {
        let segment: ClockSegment = "9:00-13:00".parse().unwrap();
        assert_eq!(segment, ClockSegment::new("9:00", "13:00"));
        assert_eq!(segment.to_string(), "9:00-13:00");

        assert!(matches!(
            "9:00".parse::<ClockSegment>(),
            Err(ConfigError::InvalidSegmentSyntax(_))
        ));
        assert!(matches!(
            "-13:00".parse::<ClockSegment>(),
            Err(ConfigError::InvalidSegmentSyntax(_))
        ));
    }

    #[test]
    fn clock_json_requires_both_fields() {
        let clock =
            parse_clock_json(r#"[{"clock_in":"7:00","clock_out":"15:00"}]"#).unwrap();
        assert_eq!(clock, vec![ClockSegment::new("7:00", "15:00")]);

        assert!(matches!(
            parse_clock_json(r#"[{"clock_in":"7:00"}]"#),
            Err(ConfigError::ClockJson(_))
        ));
        assert!(matches!(
            parse_clock_json(r#"{"clock_in":"7:00","clock_out":"15:00"}"#),
            Err(ConfigError::ClockJson(_))
        ));
    }
}
