//! Day stamping. All cycle dates are UTC calendar days, ISO-8601 when persisted.

use chrono::{Duration, NaiveDate, Utc};

/// The current UTC calendar day.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The day before the given cycle date.
pub fn day_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}
