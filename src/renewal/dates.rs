//! Calendar arithmetic for expiry dates.
//!
//! Year addition follows the usual calendar rollover: a Feb 29 base date
//! landing on a non-leap year becomes Mar 1 of that year. This is an
//! accepted edge case and is not clamped to Feb 28.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Add `years` calendar years to `date`.
///
/// Returns `None` only when the result falls outside chrono's date range.
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let target_year = date.year().checked_add(i32::try_from(years).ok()?)?;
    shift_to_year(date, target_year)
}

/// Inverse of [`add_years`]. Exact for every date except Feb 29 bases that
/// rolled over to Mar 1.
pub fn subtract_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let target_year = date.year().checked_sub(i32::try_from(years).ok()?)?;
    shift_to_year(date, target_year)
}

fn shift_to_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Whole days until `expiry`, rounded up.
///
/// The expiry is taken at UTC midnight. Zero on the boundary, negative once
/// the expiry day has fully passed.
pub fn days_remaining(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expiry_ms = expiry
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default();
    let diff = expiry_ms - now.timestamp_millis();
    // ceil(diff / day) for both signs
    -((-diff).div_euclid(MILLIS_PER_DAY))
}

/// Parse a user or spreadsheet supplied date into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD` and RFC 3339 timestamps
/// (the date part is kept).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Convert a spreadsheet serial day number (1900 date system) to a date.
pub fn from_serial_day(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(chrono::Days::new(serial.trunc() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adds_whole_years() {
        assert_eq!(add_years(ymd(2025, 1, 1), 1), Some(ymd(2026, 1, 1)));
        assert_eq!(add_years(ymd(2026, 1, 1), 2), Some(ymd(2028, 1, 1)));
        assert_eq!(add_years(ymd(2024, 12, 31), 3), Some(ymd(2027, 12, 31)));
    }

    #[test]
    fn leap_day_rolls_over_to_march() {
        assert_eq!(add_years(ymd(2024, 2, 29), 1), Some(ymd(2025, 3, 1)));
        assert_eq!(add_years(ymd(2024, 2, 29), 4), Some(ymd(2028, 2, 29)));
    }

    #[test]
    fn subtract_inverts_add_outside_leap_day() {
        for (date, years) in [
            (ymd(2025, 1, 1), 1),
            (ymd(2023, 7, 15), 5),
            (ymd(2024, 2, 28), 1),
            (ymd(2000, 12, 31), 30),
        ] {
            let forward = add_years(date, years).unwrap();
            assert_eq!(subtract_years(forward, years), Some(date));
        }

        let rolled = add_years(ymd(2024, 2, 29), 1).unwrap();
        assert_ne!(subtract_years(rolled, 1), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn out_of_range_year_is_none() {
        assert_eq!(add_years(ymd(2025, 1, 1), u32::MAX), None);
        assert_eq!(add_years(ymd(2025, 1, 1), 1_000_000), None);
    }

    #[test]
    fn days_remaining_rounds_up() {
        let expiry = ymd(2026, 1, 10);
        let morning = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap();
        assert_eq!(days_remaining(expiry, morning), 5);

        let midnight = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(days_remaining(expiry, midnight), 5);
    }

    #[test]
    fn days_remaining_zero_on_boundary_and_negative_after() {
        let expiry = ymd(2026, 1, 10);
        let exact = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(days_remaining(expiry, exact), 0);

        let same_day = Utc.with_ymd_and_hms(2026, 1, 10, 18, 0, 0).unwrap();
        assert_eq!(days_remaining(expiry, same_day), 0);

        let next_day = Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 1).unwrap();
        assert_eq!(days_remaining(expiry, next_day), -1);

        let later = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert!(days_remaining(expiry, later) < 0);
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(parse_date("2025-01-01"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_date(" 2025/3/7 "), Some(ymd(2025, 3, 7)));
        assert_eq!(parse_date("2025.12.31"), Some(ymd(2025, 12, 31)));
        assert_eq!(parse_date("2025-06-01T08:00:00Z"), Some(ymd(2025, 6, 1)));
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn serial_days_map_to_calendar_dates() {
        assert_eq!(from_serial_day(45658.0), Some(ymd(2025, 1, 1)));
        assert_eq!(from_serial_day(45658.75), Some(ymd(2025, 1, 1)));
        assert_eq!(from_serial_day(0.0), None);
        assert_eq!(from_serial_day(f64::NAN), None);
    }
}
