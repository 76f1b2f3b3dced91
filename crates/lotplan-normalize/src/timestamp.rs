//! Date + time text parsing

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_FIRST: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M",
    "%Hh%M",
    "%I:%M %p",
    "%I:%M:%S %p",
];

fn parse_date(text: &str, day_first: bool) -> Option<NaiveDate> {
    let (preferred, fallback) = if day_first {
        (DAY_FIRST, MONTH_FIRST)
    } else {
        (MONTH_FIRST, DAY_FIRST)
    };
    YEAR_FIRST
        .iter()
        .chain(preferred)
        .chain(fallback)
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

/// Parse a `"<date> <time>"` string.
///
/// The date is everything before the first whitespace and the time
/// everything after it; both parts are required. With `day_first`,
/// `03/04/2025` is the 3rd of April, otherwise the 4th of March. A date
/// that is only valid one way round (`24/03/2025`) parses either way.
pub fn parse_timestamp(text: &str, day_first: bool) -> Option<NaiveDateTime> {
    let (date_part, time_part) = text.trim().split_once(char::is_whitespace)?;
    let date = parse_date(date_part, day_first)?;
    let time = parse_time(time_part.trim())?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn iso_date_with_minutes() {
        assert_eq!(
            parse_timestamp("2025-03-24 08:00", false),
            Some(at(2025, 3, 24, 8, 0, 0))
        );
    }

    #[test]
    fn iso_date_with_seconds() {
        assert_eq!(
            parse_timestamp("2025-03-24 08:15:30", true),
            Some(at(2025, 3, 24, 8, 15, 30))
        );
    }

    #[test]
    fn fractional_seconds() {
        use chrono::Timelike;
        let ts = parse_timestamp("2025-03-24 08:15:30.250", false).unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn ambiguous_slash_dates_follow_day_first() {
        assert_eq!(
            parse_timestamp("03/04/2025 08:00", true),
            Some(at(2025, 4, 3, 8, 0, 0))
        );
        assert_eq!(
            parse_timestamp("03/04/2025 08:00", false),
            Some(at(2025, 3, 4, 8, 0, 0))
        );
    }

    #[test]
    fn unambiguous_day_first_parses_either_way() {
        let expected = Some(at(2025, 3, 24, 6, 30, 0));
        assert_eq!(parse_timestamp("24/03/2025 06:30", true), expected);
        assert_eq!(parse_timestamp("24/03/2025 06:30", false), expected);
        assert_eq!(parse_timestamp("24.03.2025 06:30", true), expected);
    }

    #[test]
    fn alternative_time_notations() {
        assert_eq!(
            parse_timestamp("2025-03-24 14h30", false),
            Some(at(2025, 3, 24, 14, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2025-03-24 2:30 PM", false),
            Some(at(2025, 3, 24, 14, 30, 0))
        );
    }

    #[test]
    fn missing_parts_fail() {
        assert_eq!(parse_timestamp("2025-03-24 ", false), None);
        assert_eq!(parse_timestamp(" 08:00", false), None);
        assert_eq!(parse_timestamp(" ", false), None);
    }

    #[test]
    fn garbage_fails() {
        assert_eq!(parse_timestamp("tomorrow 08:00", false), None);
        assert_eq!(parse_timestamp("2025-13-40 08:00", false), None);
        assert_eq!(parse_timestamp("2025-03-24 25:00", false), None);
        assert_eq!(parse_timestamp("2025-03-24 nan", false), None);
    }

    #[test]
    fn datetime_in_date_cell_with_blank_time() {
        // A full timestamp in the date column survives an empty time column
        assert_eq!(
            parse_timestamp("2025-03-24 08:00:00 ", false),
            Some(at(2025, 3, 24, 8, 0, 0))
        );
    }
}
