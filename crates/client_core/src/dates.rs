use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse an `issued_on` value the way the list and the form both read it.
///
/// Date-only values land on midnight. Offsets are normalized to UTC.
pub fn parse_issued_on(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Calendar day of an `issued_on` value. Offset timestamps keep the day written
/// in their own offset rather than the UTC one.
pub fn parse_issued_on_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(parsed.date_naive());
    }
    parse_issued_on(raw).map(|parsed| parsed.date())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_calendar_dates_at_midnight() {
        let parsed = parse_issued_on("2024-01-05").expect("date");
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 5).expect("ymd"));
        assert_eq!(parsed.time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn parses_timestamps_with_and_without_offsets() {
        assert!(parse_issued_on("2024-01-05T10:30:00Z").is_some());
        assert!(parse_issued_on("2024-01-05T10:30:00+02:00").is_some());
        assert!(parse_issued_on("2024-01-05T10:30:00").is_some());
        assert!(parse_issued_on("2024-01-05 10:30:00").is_some());
    }

    #[test]
    fn offset_timestamps_keep_their_written_day() {
        let day = parse_issued_on_date("2026-03-11T01:00:00+05:00").expect("date");
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 3, 11).expect("ymd"));
        let day = parse_issued_on_date("2026-03-10T22:00:00-05:00").expect("date");
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 3, 10).expect("ymd"));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_issued_on("").is_none());
        assert!(parse_issued_on("not a date").is_none());
        assert!(parse_issued_on("2024-02-30").is_none());
    }
}
