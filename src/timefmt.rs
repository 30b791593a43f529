/// Duration and date formatting shared by the engine, store and CLI.
use chrono::{Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> f64 {
    Local::now().timestamp_millis() as f64 / 1000.0
}

/// Render seconds as HH:MM:SS. Minutes and seconds are zero-padded to two
/// digits; the hours field grows unbounded (no wrap at 24). Negative or
/// non-finite input renders as 00:00:00.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0) as i64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Parse an HH:MM:SS string back to seconds. Malformed input parses as 0.0.
pub fn parse_time_str(value: &str) -> f64 {
    let mut parts = value.trim().splitn(3, ':');
    let (Some(h), Some(m), Some(s)) = (parts.next(), parts.next(), parts.next()) else {
        return 0.0;
    };
    match (h.parse::<i64>(), m.parse::<i64>(), s.parse::<i64>()) {
        (Ok(h), Ok(m), Ok(s)) if h >= 0 && m >= 0 && s >= 0 => (h * 3600 + m * 60 + s) as f64,
        _ => 0.0,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Render a Unix timestamp as a local DD/MM/YYYY HH:MM:SS string.
pub fn format_datetime(epoch: f64) -> String {
    match Local.timestamp_opt(epoch.max(0.0) as i64, 0) {
        LocalResult::Single(dt) => dt.format(DATETIME_FORMAT).to_string(),
        _ => String::new(),
    }
}

/// Parse a local DD/MM/YYYY HH:MM:SS string back to a Unix timestamp.
/// Malformed input parses as 0.0.
pub fn parse_datetime(value: &str) -> f64 {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp() as f64)
        .unwrap_or(0.0)
}

/// Local calendar date of a Unix timestamp.
pub fn local_date(epoch: f64) -> NaiveDate {
    match Local.timestamp_opt(epoch.max(0.0) as i64, 0) {
        LocalResult::Single(dt) => dt.date_naive(),
        _ => NaiveDate::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(125.0), "00:02:05");
        assert_eq!(format_time(3661.0), "01:01:01");
    }

    #[test]
    fn format_time_hours_grow_unbounded() {
        assert_eq!(format_time(90_000.0), "25:00:00");
        assert_eq!(format_time(360_000.0), "100:00:00");
    }

    #[test]
    fn format_time_clamps_bad_input() {
        assert_eq!(format_time(-5.0), "00:00:00");
        assert_eq!(format_time(f64::NAN), "00:00:00");
        assert_eq!(format_time(f64::NEG_INFINITY), "00:00:00");
    }

    #[test]
    fn parse_time_str_reads_hms() {
        assert_eq!(parse_time_str("00:02:05"), 125.0);
        assert_eq!(parse_time_str("25:00:00"), 90_000.0);
        assert_eq!(parse_time_str(" 01:01:01 "), 3661.0);
    }

    #[test]
    fn parse_time_str_malformed_is_zero() {
        assert_eq!(parse_time_str(""), 0.0);
        assert_eq!(parse_time_str("12:34"), 0.0);
        assert_eq!(parse_time_str("a:b:c"), 0.0);
        assert_eq!(parse_time_str("1:2:3:4"), 0.0);
        assert_eq!(parse_time_str("-1:00:00"), 0.0);
    }

    #[test]
    fn format_parse_round_trip_floors() {
        for x in [0.0, 1.0, 59.9, 125.0, 3599.5, 86_400.0, 123_456.78] {
            assert_eq!(parse_time_str(&format_time(x)), x.floor());
        }
    }

    #[test]
    fn date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date), "09/03/2024");
        assert_eq!(parse_date("09/03/2024"), Some(date));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn datetime_round_trip() {
        let epoch = 1_700_000_000.0;
        let text = format_datetime(epoch);
        assert_eq!(parse_datetime(&text), epoch);
        assert_eq!(parse_datetime("31/02/2024 99:00:00"), 0.0);
        assert_eq!(parse_datetime(""), 0.0);
    }
}
