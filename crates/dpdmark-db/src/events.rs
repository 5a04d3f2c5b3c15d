//! Event log (`metrics` table). Append-only; only aggregates are read back.

use chrono::NaiveDate;
use dpdmark_core::error::{MarketingError, Result};
use dpdmark_core::models::Event;
use dpdmark_core::time::{DATE_LEN, date_of, format_date, format_ts};
use rusqlite::{Connection, params};

use crate::MarketingDb;

/// Insert on an existing connection or transaction.
pub(crate) fn insert_event_on(conn: &Connection, event: &Event) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO metrics (id, ts, source, medium, campaign, content, term, ip, user_agent, referrer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            event.id,
            format_ts(event.timestamp),
            event.source,
            event.medium,
            event.campaign,
            event.content,
            event.term,
            event.ip,
            event.user_agent,
            event.referrer,
        ],
    )?;
    Ok(())
}

impl MarketingDb {
    /// Append one event.
    pub fn insert_event(&self, event: &Event) -> Result<()> {
        let conn = self.lock()?;
        insert_event_on(&conn, event).map_err(|e| MarketingError::storage("Insert event", e))
    }

    /// Calendar dates of every event on or after `start`.
    ///
    /// The filter and the returned date use the same `YYYY-MM-DD` prefix of
    /// the stored timestamp, so the window boundary is exact.
    pub fn event_dates_since(&self, start: NaiveDate) -> Result<Vec<NaiveDate>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT substr(ts, 1, {DATE_LEN}) FROM metrics WHERE substr(ts, 1, {DATE_LEN}) >= ?1"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let prefixes = stmt
            .query_map(params![format_date(start)], |row| row.get::<_, String>(0))
            .map_err(|e| MarketingError::storage("Query events", e))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| MarketingError::storage("Read event", e))?;
        Ok(prefixes.iter().filter_map(|d| date_of(d)).collect())
    }

    pub fn count_events(&self) -> Result<u64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM metrics", [], |r| r.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| MarketingError::storage("Count events", e))
    }

    /// Number of events tagged with `medium`.
    pub fn count_events_by_medium(&self, medium: &str) -> Result<u64> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*) FROM metrics WHERE medium = ?1",
            params![medium],
            |r| r.get::<_, i64>(0),
        )
        .map(|n| n as u64)
        .map_err(|e| MarketingError::storage("Count events", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dpdmark_core::models::NewEvent;

    fn temp_db() -> MarketingDb {
        MarketingDb::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_count() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        db.insert_event(&NewEvent::new().medium("social").into_event(now)).unwrap();
        db.insert_event(&NewEvent::new().medium("email").into_event(now)).unwrap();
        db.insert_event(&NewEvent::new().into_event(now)).unwrap();
        assert_eq!(db.count_events().unwrap(), 3);
        assert_eq!(db.count_events_by_medium("social").unwrap(), 1);
        assert_eq!(db.count_events_by_medium("cpc").unwrap(), 0);
    }

    #[test]
    fn test_event_dates_since_boundary() {
        let db = temp_db();
        let start = NaiveDate::from_ymd_opt(2026, 10, 4).unwrap();
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap();

        for ts in [at(3, 23), at(4, 0), at(4, 12), at(5, 1)] {
            db.insert_event(&NewEvent::new().at(ts).into_event(ts)).unwrap();
        }

        let mut dates = db.event_dates_since(start).unwrap();
        dates.sort();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], start);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2026, 10, 5).unwrap());
    }

    #[test]
    fn test_event_dates_since_surfaces_unreadable_rows() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        db.insert_event(&NewEvent::new().into_event(now)).unwrap();
        // A blob timestamp sorts after every text value and cannot be read back as text
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO metrics (id, ts) VALUES ('bad', X'323032362D31302D3035')",
                [],
            )
            .unwrap();

        let err = db
            .event_dates_since(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, MarketingError::Storage(_)));
    }

    #[test]
    fn test_duplicate_event_id_is_storage_failure() {
        let db = temp_db();
        let event = NewEvent::new().into_event(Utc::now());
        db.insert_event(&event).unwrap();
        let err = db.insert_event(&event).unwrap_err();
        assert!(matches!(err, MarketingError::Storage(_)));
    }
}
