//! Daily traffic buckets.

use chrono::{Duration, NaiveDate};
use dpdmark_core::error::{MarketingError, Result};
use serde::{Deserialize, Serialize};

/// Longest window the summary accepts.
pub const MAX_SUMMARY_DAYS: u32 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// First day of a `days`-long window ending on `today` inclusive.
pub fn window_start(days: u32, today: NaiveDate) -> Result<NaiveDate> {
    if days == 0 || days > MAX_SUMMARY_DAYS {
        return Err(MarketingError::InvalidInput(format!(
            "days must be between 1 and {MAX_SUMMARY_DAYS}, got {days}"
        )));
    }
    Ok(today - Duration::days(i64::from(days) - 1))
}

/// Count `dates` into one zeroed bucket per day of the window, ascending.
/// Dates outside the window are dropped.
pub fn bucket_counts(dates: &[NaiveDate], days: u32, today: NaiveDate) -> Result<Vec<DailyCount>> {
    let start = window_start(days, today)?;
    let mut buckets: Vec<DailyCount> = (0..i64::from(days))
        .map(|i| DailyCount {
            date: start + Duration::days(i),
            count: 0,
        })
        .collect();

    for date in dates {
        let offset = (*date - start).num_days();
        if (0..i64::from(days)).contains(&offset) {
            buckets[offset as usize].count += 1;
        }
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_day_window() {
        let today = d(2026, 10, 17);
        assert_eq!(
            bucket_counts(&[today], 1, today).unwrap(),
            vec![DailyCount { date: today, count: 1 }]
        );
        assert_eq!(
            bucket_counts(&[], 1, today).unwrap(),
            vec![DailyCount { date: today, count: 0 }]
        );
    }

    #[test]
    fn test_contiguous_ascending() {
        let today = d(2026, 3, 2);
        let buckets = bucket_counts(&[], 14, today).unwrap();
        assert_eq!(buckets.len(), 14);
        assert_eq!(buckets.last().unwrap().date, today);
        assert_eq!(buckets[0].date, d(2026, 2, 17));
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_boundary_inclusive() {
        let today = d(2026, 10, 17);
        let start = window_start(7, today).unwrap();
        assert_eq!(start, d(2026, 10, 11));

        let dates = [start, start - Duration::days(1), today, today + Duration::days(1)];
        let buckets = bucket_counts(&dates, 7, today).unwrap();
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[6].count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 2);
    }

    #[test]
    fn test_invalid_days() {
        let today = d(2026, 10, 17);
        assert!(matches!(window_start(0, today), Err(MarketingError::InvalidInput(_))));
        assert!(window_start(MAX_SUMMARY_DAYS, today).is_ok());
        assert!(window_start(MAX_SUMMARY_DAYS + 1, today).is_err());
    }

    #[test]
    fn test_serializes_as_date_string() {
        let json = serde_json::to_value(DailyCount { date: d(2026, 1, 5), count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2026-01-05", "count": 3}));
    }
}
