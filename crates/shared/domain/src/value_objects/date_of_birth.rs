use chrono::{DateTime, Months, Utc};

use crate::constants::{MAX_AGE_YEARS, MIN_AGE_YEARS};
use crate::error::{DomainResult, ValidationErrorDetail};

const FIELD: &str = "dateOfBirth";

/// Birth date of a user aged at least 16 and younger than 120 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOfBirth(DateTime<Utc>);

impl DateOfBirth {
    /// Validate against the current time.
    pub fn parse(value: DateTime<Utc>) -> DomainResult<Self> {
        Self::parse_at(value, Utc::now())
    }

    /// Validate against an explicit `now`.
    ///
    /// Accepts `now - 120y < value <= now - 16y`; future dates are reported first.
    pub fn parse_at(value: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<Self> {
        if value > now {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "past",
                "Date of birth cannot be in the future.",
            ));
        }

        let oldest = years_before(now, MAX_AGE_YEARS);
        if value <= oldest {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "max",
                format!("Date of birth cannot be older than {MAX_AGE_YEARS} years."),
            )
            .with_param(MAX_AGE_YEARS.to_string()));
        }

        let youngest = years_before(now, MIN_AGE_YEARS);
        if value > youngest {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "min",
                format!("Date of birth cannot be younger than {MIN_AGE_YEARS} years."),
            )
            .with_param(MIN_AGE_YEARS.to_string()));
        }

        Ok(Self(value))
    }

    /// Restore a date validated when it was written at `written_at`.
    ///
    /// The age window only applies when a value is set, so a stored user
    /// ageing past it stays readable. Only dates after the write are rejected.
    pub fn from_stored(value: DateTime<Utc>, written_at: DateTime<Utc>) -> DomainResult<Self> {
        if value > written_at {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "past",
                "Date of birth cannot be in the future.",
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar subtraction; saturates at the earliest representable instant.
fn years_before(now: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(years * 12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
