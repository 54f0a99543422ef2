//! Delivery-date arithmetic.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Business days until a standard order arrives.
pub const STANDARD_DELIVERY_DAYS: u32 = 5;

/// Business days until an express order arrives.
pub const EXPRESS_DELIVERY_DAYS: u32 = 2;

/// Source of "today" for delivery estimates.
pub trait Clock: Send + Sync {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whether `date` falls Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance `date` by `days` business days.
///
/// Walks forward one calendar day at a time and counts only weekdays, so
/// Friday + 1 is Monday and Saturday + 1 is Monday. Zero returns `date`.
pub fn add_business_days(date: NaiveDate, days: u32) -> NaiveDate {
    let mut current = date;
    let mut counted = 0;
    while counted < days {
        current += Duration::days(1);
        if is_business_day(current) {
            counted += 1;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_friday_plus_one_is_monday() {
        // 2024-03-01 is a Friday.
        assert_eq!(add_business_days(date(2024, 3, 1), 1), date(2024, 3, 4));
    }

    #[test]
    fn test_monday_plus_five_is_next_monday() {
        assert_eq!(add_business_days(date(2024, 3, 4), 5), date(2024, 3, 11));
    }

    #[test]
    fn test_weekend_start() {
        assert_eq!(add_business_days(date(2024, 3, 2), 1), date(2024, 3, 4));
        assert_eq!(add_business_days(date(2024, 3, 3), 2), date(2024, 3, 5));
    }

    #[test]
    fn test_zero_days_is_identity() {
        let saturday = date(2024, 3, 2);
        assert_eq!(add_business_days(saturday, 0), saturday);
    }

    #[test]
    fn test_express_estimate_from_thursday() {
        assert_eq!(
            add_business_days(date(2024, 2, 29), EXPRESS_DELIVERY_DAYS),
            date(2024, 3, 4)
        );
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date(2024, 12, 24));
        assert_eq!(clock.today(), date(2024, 12, 24));
    }
}
