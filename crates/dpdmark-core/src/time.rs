//! Timestamp encoding.
//!
//! Every persisted timestamp is UTC, RFC 3339, microsecond precision, `Z`
//! suffix. Fixed width keeps lexical order equal to chronological order, and
//! the first 10 characters are always the calendar date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

/// Length of the `YYYY-MM-DD` prefix.
pub const DATE_LEN: usize = 10;

/// Current time at storage precision, so a value survives a round trip unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Encode a timestamp for storage.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Calendar-date part of a stored timestamp.
pub fn date_of(ts: &str) -> Option<NaiveDate> {
    ts.get(..DATE_LEN)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Encode a date the same way stored timestamps begin.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a client-supplied datetime.
///
/// Accepts RFC 3339 with any offset, or a naive `YYYY-MM-DDTHH:MM[:SS[.f]]`
/// which is taken as UTC.
pub fn parse_client_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Some(ts) = parse_ts(s) {
        return Some(ts);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// RFC 2822 form used by RSS `<pubDate>`.
pub fn rfc2822(ts: DateTime<Utc>) -> String {
    ts.to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let (fa, fb) = (format_ts(a), format_ts(b));
        assert_eq!(fa, "2026-01-02T03:04:05.000000Z");
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
    }

    #[test]
    fn test_roundtrip_and_date() {
        let t = Utc.with_ymd_and_hms(2026, 10, 17, 23, 59, 59).unwrap();
        let s = format_ts(t);
        assert_eq!(parse_ts(&s), Some(t));
        let n = now();
        assert_eq!(parse_ts(&format_ts(n)), Some(n));
        assert_eq!(date_of(&s), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(date_of("bad"), None);
    }

    #[test]
    fn test_parse_client_datetime() {
        let utc = Utc.with_ymd_and_hms(2026, 10, 17, 10, 0, 0).unwrap();
        assert_eq!(parse_client_datetime("2026-10-17T10:00:00Z"), Some(utc));
        assert_eq!(parse_client_datetime("2026-10-17T12:00:00+02:00"), Some(utc));
        assert_eq!(parse_client_datetime("2026-10-17T10:00"), Some(utc));
        assert_eq!(parse_client_datetime("2026-10-17 10:00:00"), Some(utc));
        assert_eq!(parse_client_datetime("tomorrow"), None);
    }
}
