// src/lib.rs

pub mod calendar;
pub mod config;
pub mod factorial_client;
pub mod factorial_data;
pub mod poster;


pub use calendar::{DateSource, FixedDateSource, SystemDateSource};
pub use config::{ApiConfig, ClockSegment, ConfigError, ShiftPosterConfig};
pub use factorial_client::{AttendanceApi, FactorialClient, FactorialError, Session};
pub use poster::{
    plan_shifts, CleanOutcome, PeriodStatus, PlannedShift, PopulateOutcome, ShiftPoster,
    ShiftPosterError,
};
