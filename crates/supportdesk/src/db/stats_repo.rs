//! Queue statistics: totals and a per-day timeline for reporting.

use rusqlite::params;
use serde::Serialize;

use crate::email::{Priority, Status};

use super::{Database, DatabaseError};

/// Headline counts for the support queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total: u64,
    pub urgent: u64,
    pub pending: u64,
    pub resolved: u64,
}

/// Emails sent on one day with one priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: String,
    pub priority: Priority,
    pub count: u64,
}

pub fn queue_stats(db: &Database) -> Result<QueueStats, DatabaseError> {
    db.with_conn(|conn| {
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(priority = ?1), 0),
                    COALESCE(SUM(status = ?2), 0),
                    COALESCE(SUM(status = ?3), 0)
             FROM emails",
            params![
                Priority::Urgent.as_str(),
                Status::Pending.as_str(),
                Status::Resolved.as_str()
            ],
            |row| {
                Ok(QueueStats {
                    total: row.get(0)?,
                    urgent: row.get(1)?,
                    pending: row.get(2)?,
                    resolved: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    })
}

/// Counts per calendar day (UTC) and priority. Rows without a parsed date are skipped.
pub fn daily_timeline(db: &Database) -> Result<Vec<DailyCount>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT substr(sent_date, 1, 10) AS day, priority, COUNT(*)
             FROM emails
             WHERE sent_date GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T*'
             GROUP BY day, priority
             ORDER BY day, priority DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DailyCount {
                    date: row.get(0)?,
                    priority: Priority::from_label(&row.get::<_, String>(1)?),
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
