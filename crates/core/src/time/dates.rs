use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{de, Deserialize, Deserializer};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 date or date-time.
///
/// Offsets are normalised to UTC and dropped; bare dates resolve to midnight.
pub fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parses an ISO-8601 date or date-time down to its calendar date.
///
/// Unlike [`parse_iso_datetime`], an offset is not applied: the date is the one
/// written in the string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(dt.date_naive());
    }
    parse_iso_datetime(s).map(|dt| dt.date())
}

/// English weekday name ("Monday", "Tuesday", ...).
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

pub fn de_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_iso_datetime(&s)
        .ok_or_else(|| de::Error::custom(format!("invalid ISO date or date-time: {s:?}")))
}

pub fn de_opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse_iso_datetime(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO date or date-time: {s:?}"))),
    }
}

pub fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_iso_date(&s).ok_or_else(|| de::Error::custom(format!("invalid ISO date: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_iso_datetime("2024-05-06").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn parses_naive_and_offset_datetimes() {
        let naive = parse_iso_datetime("2024-05-06T08:30:00").unwrap();
        assert_eq!(naive.format("%H:%M").to_string(), "08:30");

        // 02:00 at +03:00 is 23:00 UTC the previous day.
        let offset = parse_iso_datetime("2024-05-06T02:00:00+03:00").unwrap();
        assert_eq!(offset.date(), NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }

    #[test]
    fn calendar_date_ignores_offset() {
        let d = parse_iso_date("2024-05-07T02:00:00+03:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 5, 7).unwrap());
        assert_eq!(
            parse_iso_date("2024-05-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 7).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_iso_datetime("").is_none());
        assert!(parse_iso_datetime("next tuesday").is_none());
        assert!(parse_iso_date("2024-13-01").is_none());
    }

    #[test]
    fn weekday_names_are_english() {
        // 2024-05-06 is a Monday.
        let d = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(weekday_name(d), "Monday");
        assert_eq!(weekday_name(d.succ_opt().unwrap()), "Tuesday");
    }
}
