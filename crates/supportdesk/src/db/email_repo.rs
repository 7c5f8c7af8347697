//! Email repository: natural-key upsert and workflow updates for the `emails` table.
//!
//! The natural key is `(sender, subject, sent_date)`, with a missing
//! `sent_date` matching another missing `sent_date`. Upsert merges into the
//! existing row instead of failing on a duplicate key.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::email::{
    EmailRecord, EnrichedEmail, Priority, SentDate, Sentiment, Status, WorkflowWrite,
};

use super::{Database, DatabaseError};

const SELECT_COLUMNS: &str = "id, sender, subject, body, sent_date, priority, sentiment, topics,
     extracted_emails, extracted_phones, ai_reply, status, updated_at";

/// Row counts from one upsert call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Targeted change to a row's workflow fields. `None` leaves a field as is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub ai_reply: Option<String>,
    pub status: Option<Status>,
}

impl FieldUpdate {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            ai_reply: Some(text.into()),
            status: None,
        }
    }

    pub fn status(status: Status) -> Self {
        Self {
            ai_reply: None,
            status: Some(status),
        }
    }
}

/// Query filter parameters for queue listing.
#[derive(Debug, Default, Clone)]
pub struct EmailFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub limit: Option<u64>,
}

enum MergeOutcome {
    Inserted,
    Updated,
}

fn record_from_row(row: &Row<'_>) -> Result<EmailRecord, rusqlite::Error> {
    Ok(EmailRecord {
        id: row.get(0)?,
        sender: row.get(1)?,
        subject: row.get(2)?,
        body: row.get(3)?,
        sent_date: row
            .get::<_, Option<String>>(4)?
            .map(|s| SentDate::from_storage(&s)),
        priority: Priority::from_label(&row.get::<_, String>(5)?),
        sentiment: Sentiment::from_label(&row.get::<_, String>(6)?),
        topics: decode_list(row, 7)?,
        extracted_emails: decode_list(row, 8)?,
        extracted_phones: decode_list(row, 9)?,
        ai_reply: row.get(10)?,
        status: Status::from_label(&row.get::<_, String>(11)?),
        updated_at: decode_timestamp(row, 12)?,
    })
}

fn decode_list(row: &Row<'_>, idx: usize) -> Result<Option<Vec<String>>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn decode_timestamp(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn encode_list(list: Option<&Vec<String>>) -> Result<Option<String>, DatabaseError> {
    Ok(list.map(serde_json::to_string).transpose()?)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at stored precision, forced past `previous` so that
/// successive writes to one row always move `updated_at` forward.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Merges a batch into the store by natural key, inside one transaction.
///
/// Existing rows keep their id. Content and derived fields are always
/// overwritten; `ai_reply` and `status` follow each record's [`WorkflowWrite`].
pub fn upsert(db: &Database, batch: &[EnrichedEmail]) -> Result<UpsertSummary, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        let mut summary = UpsertSummary::default();
        for email in batch {
            match merge_one(&tx, email)? {
                MergeOutcome::Inserted => summary.inserted += 1,
                MergeOutcome::Updated => summary.updated += 1,
            }
        }
        tx.commit()?;

        log::info!(
            "Upserted {} emails ({} inserted, {} updated)",
            batch.len(),
            summary.inserted,
            summary.updated
        );
        Ok(summary)
    })
}

fn merge_one(conn: &Connection, email: &EnrichedEmail) -> Result<MergeOutcome, DatabaseError> {
    let sent_date = email.sent_date.as_ref().map(SentDate::to_storage);

    if let Some((id, previous)) =
        find_key(conn, &email.sender, &email.subject, sent_date.as_deref())?
    {
        update_existing(conn, id, previous, email)?;
        return Ok(MergeOutcome::Updated);
    }

    match insert_new(conn, email, sent_date.as_deref()) {
        Ok(()) => Ok(MergeOutcome::Inserted),
        // Another writer created the same key between the lookup and the insert.
        Err(DatabaseError::Sqlite(e))
            if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) =>
        {
            log::debug!("Natural key collision on insert, merging instead");
            let (id, previous) =
                find_conflict(conn, &email.sender, &email.subject, sent_date.as_deref())?
                    .ok_or(DatabaseError::Sqlite(e))?;
            update_existing(conn, id, previous, email)?;
            Ok(MergeOutcome::Updated)
        }
        Err(e) => Err(e),
    }
}

fn find_key(
    conn: &Connection,
    sender: &str,
    subject: &str,
    sent_date: Option<&str>,
) -> Result<Option<(i64, DateTime<Utc>)>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT id, updated_at FROM emails
             WHERE sender = ?1 AND subject = ?2 AND sent_date IS ?3",
            params![sender, subject, sent_date],
            |row| Ok((row.get::<_, i64>(0)?, decode_timestamp(row, 1)?)),
        )
        .optional()?;
    Ok(found)
}

/// Looks up the row that owns the unique index entry for this key, which
/// also matches rows whose date was written as empty text.
fn find_conflict(
    conn: &Connection,
    sender: &str,
    subject: &str,
    sent_date: Option<&str>,
) -> Result<Option<(i64, DateTime<Utc>)>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT id, updated_at FROM emails
             WHERE sender = ?1 AND subject = ?2 AND IFNULL(sent_date, '') = IFNULL(?3, '')",
            params![sender, subject, sent_date],
            |row| Ok((row.get::<_, i64>(0)?, decode_timestamp(row, 1)?)),
        )
        .optional()?;
    Ok(found)
}

fn insert_new(
    conn: &Connection,
    email: &EnrichedEmail,
    sent_date: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emails (sender, subject, body, sent_date, priority, sentiment, topics,
         extracted_emails, extracted_phones, ai_reply, status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            email.sender,
            email.subject,
            email.body,
            sent_date,
            email.priority.as_str(),
            email.sentiment.as_str(),
            encode_list(email.topics.as_ref())?,
            encode_list(email.extracted_emails.as_ref())?,
            encode_list(email.extracted_phones.as_ref())?,
            email.ai_reply,
            email.status.as_str(),
            format_timestamp(next_timestamp(None)),
        ],
    )?;
    Ok(())
}

fn update_existing(
    conn: &Connection,
    id: i64,
    previous: DateTime<Utc>,
    email: &EnrichedEmail,
) -> Result<(), DatabaseError> {
    let updated_at = format_timestamp(next_timestamp(Some(previous)));
    let topics = encode_list(email.topics.as_ref())?;
    let extracted_emails = encode_list(email.extracted_emails.as_ref())?;
    let extracted_phones = encode_list(email.extracted_phones.as_ref())?;

    match email.workflow {
        WorkflowWrite::InitialOnly => conn.execute(
            "UPDATE emails SET body=?2, priority=?3, sentiment=?4, topics=?5,
             extracted_emails=?6, extracted_phones=?7, updated_at=?8
             WHERE id=?1",
            params![
                id,
                email.body,
                email.priority.as_str(),
                email.sentiment.as_str(),
                topics,
                extracted_emails,
                extracted_phones,
                updated_at,
            ],
        )?,
        WorkflowWrite::Overwrite => conn.execute(
            "UPDATE emails SET body=?2, priority=?3, sentiment=?4, topics=?5,
             extracted_emails=?6, extracted_phones=?7, ai_reply=?8, status=?9, updated_at=?10
             WHERE id=?1",
            params![
                id,
                email.body,
                email.priority.as_str(),
                email.sentiment.as_str(),
                topics,
                extracted_emails,
                extracted_phones,
                email.ai_reply,
                email.status.as_str(),
                updated_at,
            ],
        )?,
    };
    Ok(())
}

/// Updates `ai_reply` and/or `status` of one row and refreshes `updated_at`.
///
/// Returns [`DatabaseError::NotFound`] when no row has the given id.
pub fn update_fields(db: &Database, id: i64, update: &FieldUpdate) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let previous = conn
            .query_row(
                "SELECT updated_at FROM emails WHERE id = ?1",
                params![id],
                |row| decode_timestamp(row, 0),
            )
            .optional()?
            .ok_or(DatabaseError::NotFound { id })?;

        conn.execute(
            "UPDATE emails SET ai_reply = COALESCE(?2, ai_reply), status = COALESCE(?3, status),
             updated_at = ?4 WHERE id = ?1",
            params![
                id,
                update.ai_reply,
                update.status.map(|s| s.as_str()),
                format_timestamp(next_timestamp(Some(previous))),
            ],
        )?;
        Ok(())
    })
}

/// Finds an email by its id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<EmailRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("SELECT {} FROM emails WHERE id = ?1", SELECT_COLUMNS);
        let found = conn
            .query_row(&sql, params![id], record_from_row)
            .optional()?;
        Ok(found)
    })
}

/// Returns every stored email in id order.
pub fn load_all(db: &Database) -> Result<Vec<EmailRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("SELECT {} FROM emails ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Lists the queue: urgent first, then newest sent date, undated last.
pub fn list(db: &Database, filter: &EmailFilter) -> Result<Vec<EmailRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push(format!("status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            conditions.push(format!("priority = ?{}", param_values.len() + 1));
            param_values.push(Box::new(priority.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        param_values.push(Box::new(limit));
        let sql = format!(
            "SELECT {} FROM emails {}
             ORDER BY CASE priority WHEN 'Urgent' THEN 0 ELSE 1 END,
                      sent_date IS NULL, sent_date DESC, id
             LIMIT ?{}",
            SELECT_COLUMNS,
            where_clause,
            param_values.len()
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_ref.as_slice(), record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts stored emails.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM emails", [], |r| r.get(0))?;
        Ok(count)
    })
}
