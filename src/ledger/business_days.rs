use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::{LedgerError, LedgerResult};

/// Holidays observed at one location over some window.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    pub location: String,
    holidays: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(location: impl Into<String>, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        HolidayCalendar {
            location: location.into(),
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn holidays(&self) -> &HashSet<NaiveDate> {
        &self.holidays
    }
}

/// Non-holiday days in the inclusive range `[start, end]`, in calendar order.
///
/// Submission, withdrawal and approval all derive day counts from this one
/// function so that debits and refunds can never disagree.
pub fn business_dates(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &HashSet<NaiveDate>,
) -> LedgerResult<Vec<NaiveDate>> {
    if start > end {
        return Err(LedgerError::validation(format!(
            "start_date {} cannot be after end_date {}",
            start, end
        )));
    }

    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !holidays.contains(d))
        .collect())
}

pub fn count_business_days(
    start: NaiveDate,
    end: NaiveDate,
    calendar: &HolidayCalendar,
) -> LedgerResult<i32> {
    let days = business_dates(start, end, calendar.holidays())?;
    Ok(days.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn single_day_holiday_counts_zero() {
        let india = HolidayCalendar::new("India", [d("2025-01-01")]);
        assert_eq!(count_business_days(d("2025-01-01"), d("2025-01-01"), &india).unwrap(), 0);
    }

    #[test]
    fn single_day_workday_counts_one() {
        let india = HolidayCalendar::new("India", [d("2025-01-26")]);
        assert_eq!(count_business_days(d("2025-01-01"), d("2025-01-01"), &india).unwrap(), 1);
    }

    #[test]
    fn excludes_holidays_inside_range_only() {
        let cal = HolidayCalendar::new(
            "India",
            [d("2025-08-14"), d("2025-08-15"), d("2025-09-01")],
        );
        // 10th..16th is 7 calendar days, 15th is a holiday, 14th too
        assert_eq!(count_business_days(d("2025-08-10"), d("2025-08-16"), &cal).unwrap(), 5);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cal = HolidayCalendar::default();
        let err = count_business_days(d("2025-02-02"), d("2025-02-01"), &cal).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn dates_come_back_in_calendar_order() {
        let holidays: HashSet<NaiveDate> = [d("2025-03-02")].into_iter().collect();
        let dates = business_dates(d("2025-03-01"), d("2025-03-04"), &holidays).unwrap();
        assert_eq!(dates, vec![d("2025-03-01"), d("2025-03-03"), d("2025-03-04")]);
    }
}
