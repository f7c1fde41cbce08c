// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron schedule validation and next-fire computation.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use thiserror::Error;

/// Number of fields in a supported cron expression.
const CRON_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("cron expression must have {CRON_FIELDS} fields, got {0}")]
    FieldCount(usize),

    #[error("invalid cron expression: {0}")]
    Parse(String),

    #[error("cron expression never fires")]
    NeverFires,
}

/// Parse a five-field cron expression.
///
/// The `cron` crate expects a seconds field, so a leading `0` is prefixed
/// before parsing; callers always deal in standard five-field expressions.
pub fn parse(expr: &str) -> Result<Schedule, ScheduleError> {
    let fields = expr.split_whitespace().count();
    if fields != CRON_FIELDS {
        return Err(ScheduleError::FieldCount(fields));
    }
    Schedule::from_str(&format!("0 {}", expr.trim()))
        .map_err(|e| ScheduleError::Parse(e.to_string()))
}

/// Validate a five-field cron expression.
pub fn validate_schedule(expr: &str) -> Result<(), ScheduleError> {
    parse(expr).map(|_| ())
}

/// First firing strictly after `now`.
pub fn next_fire(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
    let schedule = parse(expr)?;
    schedule.after(&now).next().ok_or(ScheduleError::NeverFires)
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
