// src/poster.rs

use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::calendar::{self, DateSource};
use crate::config::{ClockSegment, ConfigError, ShiftPosterConfig};
use crate::factorial_client::{AttendanceApi, FactorialError, Session};
use crate::factorial_data::NewShift;

#[derive(Error, Debug)]
pub enum ShiftPosterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Factorial request failed: {0}")]
    Factorial(#[from] FactorialError),
}

// --- Period Status ---

/// What period resolution found for the configured employee and month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodStatus {
    /// `build` has not run yet.
    Unresolved,
    NotFound,
    NotPending { period_id: u64, state: String },
    Pending { period_id: u64 },
}

impl PeriodStatus {
    pub fn pending_id(&self) -> Option<u64> {
        match self {
            PeriodStatus::Pending { period_id } => Some(*period_id),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodStatus::Unresolved => write!(f, "period not looked up yet"),
            PeriodStatus::NotFound => write!(f, "no attendance period found"),
            PeriodStatus::NotPending { period_id, state } => {
                write!(f, "period {} is {}", period_id, state)
            }
            PeriodStatus::Pending { period_id } => write!(f, "period {} is pending", period_id),
        }
    }
}

// --- Outcomes ---

/// One shift-creation request, before a period id is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedShift {
    pub day: u32,
    pub segment: ClockSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    Posted { requests: usize, days: Vec<u32> },
    Skipped(PeriodStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    Deleted { shifts: usize },
    Skipped(PeriodStatus),
}

/// Working days ascending, and within a day the configured segment order.
pub fn plan_shifts(config: &ShiftPosterConfig, today: NaiveDate) -> Vec<PlannedShift> {
    calendar::working_days(config.year, config.month, today, &config.holidays)
        .into_iter()
        .flat_map(|day| {
            config.clock.iter().map(move |segment| PlannedShift {
                day,
                segment: segment.clone(),
            })
        })
        .collect()
}

// --- Shift Poster ---

pub struct ShiftPoster {
    config: ShiftPosterConfig,
    api: Arc<dyn AttendanceApi>,
    dates: Arc<dyn DateSource>,
    period: PeriodStatus,
}

impl ShiftPoster {
    /// Validates `config` up front so a bad clock never reaches the network.
    pub fn new(
        config: ShiftPosterConfig,
        api: Arc<dyn AttendanceApi>,
        dates: Arc<dyn DateSource>,
    ) -> Result<Self, ShiftPosterError> {
        config.validate()?;
        Ok(Self {
            config,
            api,
            dates,
            period: PeriodStatus::Unresolved,
        })
    }

    pub fn config(&self) -> &ShiftPosterConfig {
        &self.config
    }

    pub fn period(&self) -> &PeriodStatus {
        &self.period
    }

    /// Looks up the attendance period for the configured employee and month.
    ///
    /// Only a pending period is kept. A matching period in any other state is
    /// reported and left unresolved. When several entries match, the last
    /// pending one wins.
    pub async fn build(&mut self, session: &Session) -> Result<&PeriodStatus, ShiftPosterError> {
        let ShiftPosterConfig {
            year,
            month,
            employee_id,
            ..
        } = self.config;

        let periods = self
            .api
            .list_periods(session, year, month)
            .await
            .map_err(|e| {
                error!("Failed to fetch attendance periods for {}/{}: {}", month, year, e);
                e
            })?;
        debug!("Fetched {} attendance periods", periods.len());

        let mut status = PeriodStatus::NotFound;
        for period in periods
            .iter()
            .filter(|p| p.matches(employee_id, year, month))
        {
            if period.is_pending() {
                status = PeriodStatus::Pending {
                    period_id: period.id,
                };
            } else {
                warn!(
                    "Hey! You cannot update this month, period is: {}",
                    period.state
                );
                if status.pending_id().is_none() {
                    status = PeriodStatus::NotPending {
                        period_id: period.id,
                        state: period.state.clone(),
                    };
                }
            }
        }

        match &status {
            PeriodStatus::Pending { period_id } => {
                info!("Using attendance period {} for {}/{}", period_id, month, year)
            }
            PeriodStatus::NotFound => debug!(
                "No attendance period for employee {} in {}/{}",
                employee_id, month, year
            ),
            _ => {}
        }

        self.period = status;
        Ok(&self.period)
    }

    /// Every request `populate` would issue, in submission order.
    pub fn plan(&self) -> Vec<PlannedShift> {
        plan_shifts(&self.config, self.dates.today())
    }

    /// Posts one shift per working day per clock segment, one request at a time.
    ///
    /// A transport failure aborts the remaining requests; shifts already
    /// created stay in place.
    pub async fn populate(&self, session: &Session) -> Result<PopulateOutcome, ShiftPosterError> {
        let Some(period_id) = self.period.pending_id() else {
            warn!("Wait, period id not set!");
            warn!(
                "Check month: {} and year: {}. ({})",
                self.config.month, self.config.year, self.period
            );
            return Ok(PopulateOutcome::Skipped(self.period.clone()));
        };

        let plan = self.plan();
        let mut days: Vec<u32> = Vec::new();
        for planned in &plan {
            let shift = NewShift::new(
                period_id,
                planned.day,
                &planned.segment.clock_in,
                &planned.segment.clock_out,
            );
            let body = self.api.create_shift(session, &shift).await.map_err(|e| {
                error!(
                    "Failed to post shift for day {} ({}) of {}/{}: {}",
                    planned.day, planned.segment, self.config.month, self.config.year, e
                );
                e
            })?;
            info!(
                "POST: {{ day: {}, month: {}, year: {}, time: {{ clock_in: {}, clock_out: {} }}}}",
                shift.day, self.config.month, self.config.year, shift.clock_in, shift.clock_out
            );
            info!("{}", body);

            if days.last() != Some(&planned.day) {
                days.push(planned.day);
            }
        }

        Ok(PopulateOutcome::Posted {
            requests: plan.len(),
            days,
        })
    }

    /// Deletes every shift attached to the resolved period, one at a time.
    pub async fn clean(&self, session: &Session) -> Result<CleanOutcome, ShiftPosterError> {
        let Some(period_id) = self.period.pending_id() else {
            warn!(
                "Refusing to clean shifts for {}/{}: {}",
                self.config.month, self.config.year, self.period
            );
            return Ok(CleanOutcome::Skipped(self.period.clone()));
        };

        let shifts = self.api.list_shifts(session).await.map_err(|e| {
            error!("Failed to fetch shifts: {}", e);
            e
        })?;
        debug!("Fetched {} shifts", shifts.len());

        let mut deleted = 0;
        for shift in shifts.iter().filter(|s| s.period_id == Some(period_id)) {
            info!("DELETE: {}", shift);
            self.api.delete_shift(session, shift.id).await.map_err(|e| {
                error!("Failed to delete shift {}: {}", shift.id, e);
                e
            })?;
            deleted += 1;
        }

        info!("Removed {} shifts from period {}", deleted, period_id);
        Ok(CleanOutcome::Deleted { shifts: deleted })
    }
}
