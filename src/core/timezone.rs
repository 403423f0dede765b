use chrono::{DateTime, Days, FixedOffset, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// Civil calendar used for "today" and "yesterday". The zone rule observes
/// daylight saving, so a fixed UTC offset is not a substitute.
pub const REFERENCE_TZ: Tz = chrono_tz::CET;

/// Label stored alongside each snapshot.
pub const REFERENCE_TZ_LABEL: &str = "CET";

/// The instant in the reference timezone, truncated to whole seconds.
pub fn reference_now(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    let local = instant.with_timezone(&REFERENCE_TZ).fixed_offset();
    local.with_nanosecond(0).unwrap_or(local)
}

/// Returns `(today, yesterday)` as reference-timezone calendar dates.
pub fn reference_dates(instant: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let today = instant.with_timezone(&REFERENCE_TZ).date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    (today, yesterday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_dates_cross_midnight_in_winter() {
        // 23:30 UTC in January is 00:30 CET on the next day
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        let (today, yesterday) = reference_dates(instant);
        assert_eq!(today, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(yesterday, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_reference_dates_follow_summer_time() {
        // 22:30 UTC in July is 00:30 CEST; a fixed +01:00 would still say July 10th
        let instant = Utc.with_ymd_and_hms(2024, 7, 10, 22, 30, 0).unwrap();
        let (today, yesterday) = reference_dates(instant);
        assert_eq!(today, NaiveDate::from_ymd_opt(2024, 7, 11).unwrap());
        assert_eq!(yesterday, NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
    }

    #[test]
    fn test_reference_dates_across_month_boundary() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (today, yesterday) = reference_dates(instant);
        assert_eq!(today, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(yesterday, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_reference_now_truncates_and_uses_offset() {
        let instant = Utc
            .with_ymd_and_hms(2024, 5, 17, 12, 3, 4)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let local = reference_now(instant);
        assert_eq!(
            local.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false),
            "2024-05-17T14:03:04+02:00"
        );
    }
}
