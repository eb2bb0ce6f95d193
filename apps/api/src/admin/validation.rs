use chrono::{Datelike, NaiveDate};

use crate::errors::AppError;

/// Earliest date accepted on any record.
pub const MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1950, 1, 1) {
    Some(date) => date,
    None => panic!("invalid MIN_DATE"),
};

/// Latest date accepted on any record.
pub const MAX_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2026, 1, 31) {
    Some(date) => date,
    None => panic!("invalid MAX_DATE"),
};

pub const MAX_PRICE_CENTS: i32 = 99_999;

/// Collects every problem with a payload so the admin sees them all at once.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<String>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.fail(format!("{field} is required"));
        }
    }

    /// Length in characters, not bytes.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.fail(format!("{field} must be at most {max} characters (got {len})"));
        }
    }

    pub fn max_len_opt(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.max_len(field, value, max);
        }
    }

    pub fn date_in_range(&mut self, field: &str, value: Option<NaiveDate>) {
        if let Some(date) = value {
            if date < MIN_DATE || date > MAX_DATE {
                self.fail(format!("{field} must be between {MIN_DATE} and {MAX_DATE}"));
            }
        }
    }

    pub fn date_order(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                self.fail("start_date must not be after end_date");
            }
        }
    }

    /// In the accepted range, not in the future and at least 18 years before `today`.
    pub fn birth_date(&mut self, date: NaiveDate, today: NaiveDate) {
        if date < MIN_DATE || date > MAX_DATE {
            self.fail(format!("birth_date must be between {MIN_DATE} and {MAX_DATE}"));
        }
        if date > today {
            self.fail("birth_date cannot be in the future");
        } else if age_on(date, today) < 18 {
            self.fail("the person must be at least 18 years old");
        }
    }

    pub fn min_value(&mut self, field: &str, value: Option<i32>, min: i32) {
        if let Some(value) = value {
            if value < min {
                self.fail(format!("{field} must be at least {min}"));
            }
        }
    }

    pub fn price(&mut self, cents: Option<i32>) {
        if let Some(cents) = cents {
            if cents < 0 {
                self.fail("price_cents cannot be negative");
            } else if cents > MAX_PRICE_CENTS {
                self.fail("price_cents cannot exceed 99999 (999.99)");
            }
        }
    }

    pub fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) {
        if let Some(value) = value {
            if !allowed.contains(&value) {
                self.fail(format!("{field} must be one of: {}", allowed.join(", ")));
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors.join("; ")))
        }
    }
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
