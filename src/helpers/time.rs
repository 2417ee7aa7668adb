use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::constants::defaults;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const LABEL_FORMAT: &str = "%-d %b %y";

/// Current calendar date, in `tz` if given and in the local timezone otherwise
pub fn today(tz: Option<Tz>) -> NaiveDate {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}

pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

/// Human-facing label of a report date, e.g. "15 Jan 25"
pub fn report_label(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}

/// Point in time (UTC) up to which telemetry counts for a report "as of" `date`
pub fn as_of_cutoff(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(defaults::AS_OF_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Time against which "last seen" recency is measured for a report on `date`
pub fn reference_time(date: NaiveDate, today: NaiveDate, now: NaiveDateTime) -> NaiveDateTime {
    if date >= today {
        now
    } else {
        as_of_cutoff(date)
    }
}

/// Date to query "as of" for a report on `date`; `None` means the latest readings
pub fn as_of_for(date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    (date < today).then_some(date)
}

/// The `days` calendar dates ending with `end` (inclusive), oldest first
pub fn trailing_window(end: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (0..days).rev().map(|d| end - Duration::days(d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn label_has_no_zero_padding() {
        assert_eq!(report_label(date("2025-01-05")), "5 Jan 25");
        assert_eq!(report_label(date("2025-11-15")), "15 Nov 25");
    }

    #[test]
    fn cutoff_is_noon() {
        assert_eq!(
            as_of_cutoff(date("2025-01-15")).to_string(),
            "2025-01-15 12:00:00"
        );
    }

    #[test]
    fn reference_time_for_today_is_now() {
        let now = date("2025-01-15").and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(reference_time(date("2025-01-15"), date("2025-01-15"), now), now);
        assert_eq!(
            reference_time(date("2025-01-10"), date("2025-01-15"), now),
            as_of_cutoff(date("2025-01-10"))
        );
    }

    #[test]
    fn only_past_dates_query_as_of() {
        assert_eq!(as_of_for(date("2025-01-15"), date("2025-01-15")), None);
        assert_eq!(
            as_of_for(date("2025-01-14"), date("2025-01-15")),
            Some(date("2025-01-14"))
        );
    }

    #[test]
    fn window_covers_seven_days_including_end() {
        let window = trailing_window(date("2025-03-02"), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), Some(&date("2025-02-24")));
        assert_eq!(window.last(), Some(&date("2025-03-02")));
        assert!(window.windows(2).all(|w| w[1] - w[0] == Duration::days(1)));
    }

    #[test]
    fn parse_date_trims_and_validates() {
        assert_eq!(parse_date(" 2025-03-09\n").unwrap(), date("2025-03-09"));
        assert!(parse_date("09/03/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
