use chrono::{Datelike, Duration, NaiveDate};

use crate::model::CaseDate;

/// Day-first formats come before the US month-first fallback.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d/%m/%y",
    "%d-%b-%y",
    "%m/%d/%Y",
];

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// 1954-10-03. Smaller bare numbers are years, ages or ids, not dates.
const MIN_SERIAL: f64 = 20_000.0;

/// Parse a date cell as best we can.
///
/// Blank input is `Absent`; input that matches no known format is
/// `Unparseable` and keeps the raw text.
pub fn parse_date(raw: &str) -> CaseDate {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CaseDate::Absent;
    }

    match try_formats(trimmed)
        .or_else(|| strip_time(trimmed).and_then(try_formats))
        .or_else(|| excel_serial(trimmed))
    {
        Some(date) => CaseDate::Valid(date),
        None => CaseDate::Unparseable(trimmed.to_string()),
    }
}

fn try_formats(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .filter(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()))
    })
}

/// "2025-03-04 00:00:00" / "2025-03-04T10:15" -> "2025-03-04"
fn strip_time(s: &str) -> Option<&str> {
    let (date, time) = s.split_once(['T', ' '])?;
    if time.contains(':') {
        Some(date)
    } else {
        None
    }
}

/// Spreadsheet serial day numbers (1900 date system).
fn excel_serial(s: &str) -> Option<NaiveDate> {
    let serial: f64 = s.parse().ok()?;
    if !(MIN_SERIAL..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> CaseDate {
        CaseDate::Valid(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_common_formats() {
        assert_eq!(parse_date("2025-03-04"), ymd(2025, 3, 4));
        assert_eq!(parse_date("04/03/2025"), ymd(2025, 3, 4));
        assert_eq!(parse_date("4-3-2025"), ymd(2025, 3, 4));
        assert_eq!(parse_date("04.03.2025"), ymd(2025, 3, 4));
        assert_eq!(parse_date("4-Mar-2025"), ymd(2025, 3, 4));
        assert_eq!(parse_date("4 March 2025"), ymd(2025, 3, 4));
        assert_eq!(parse_date("March 4, 2025"), ymd(2025, 3, 4));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_date("04/03/25"), ymd(2025, 3, 4));
    }

    #[test]
    fn test_month_first_fallback() {
        assert_eq!(parse_date("03/25/2025"), ymd(2025, 3, 25));
    }

    #[test]
    fn test_datetime_strings() {
        assert_eq!(parse_date("2025-04-10 00:00:00"), ymd(2025, 4, 10));
        assert_eq!(parse_date("2025-04-10T08:30:00"), ymd(2025, 4, 10));
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(parse_date("45731"), ymd(2025, 3, 15));
        assert_eq!(parse_date("45731.0"), ymd(2025, 3, 15));
    }

    #[test]
    fn test_small_numbers_are_not_serials() {
        assert_eq!(parse_date("2025"), CaseDate::Unparseable("2025".into()));
        assert_eq!(parse_date("12"), CaseDate::Unparseable("12".into()));
    }

    #[test]
    fn test_blank_and_garbage() {
        assert_eq!(parse_date("   "), CaseDate::Absent);
        assert_eq!(
            parse_date("sometime in March"),
            CaseDate::Unparseable("sometime in March".into())
        );
        assert_eq!(parse_date("31/02/2025"), CaseDate::Unparseable("31/02/2025".into()));
    }
}
