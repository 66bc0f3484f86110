use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

/// Storage format for every `created_at` / `last_login` column.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local time truncated to whole seconds, matching what is stored.
pub fn now() -> NaiveDateTime {
    let n = Local::now().naive_local();
    n.with_nanosecond(0).unwrap_or(n)
}

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FMT).to_string()
}

pub fn parse_ts(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Start of the trailing window of `days` days ending at `now`.
pub fn window_start(now: NaiveDateTime, days: i64) -> NaiveDateTime {
    now - chrono::Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_through_storage_format() {
        let ts = parse_ts("2025-06-09 10:30:00").unwrap();
        assert_eq!(format_ts(&ts), "2025-06-09 10:30:00");
        assert!(parse_ts("2025-06-09T10:30:00").is_some());
        assert!(parse_ts("09/06/2025").is_none());
    }

    #[test]
    fn window_start_goes_back_whole_days() {
        let now = parse_ts("2025-07-01 12:00:00").unwrap();
        assert_eq!(format_ts(&window_start(now, 30)), "2025-06-01 12:00:00");
    }

    #[test]
    fn parse_date_rejects_other_layouts() {
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date(" 2025-02-03 ").is_some());
    }
}
