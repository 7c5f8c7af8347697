//! Processed-queue export to CSV.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use thiserror::Error;

use crate::email::EmailRecord;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create export file '{path}': {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode list column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to flush export: {0}")]
    Flush(#[from] std::io::Error),
}

const HEADER: [&str; 13] = [
    "id",
    "sender",
    "subject",
    "body",
    "sent_date",
    "priority",
    "sentiment",
    "topics",
    "extracted_emails",
    "extracted_phones",
    "ai_reply",
    "status",
    "updated_at",
];

/// Writes records to `path`, replacing any existing file.
pub fn write_csv_path(path: &Path, records: &[EmailRecord]) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| ExportError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_csv(file, records)
}

/// Writes records as CSV. List columns are JSON arrays; absent values are empty cells.
pub fn write_csv<W: Write>(writer: W, records: &[EmailRecord]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.sender.clone(),
            record.subject.clone(),
            record.body.clone(),
            record
                .sent_date
                .as_ref()
                .map(|d| d.to_storage())
                .unwrap_or_default(),
            record.priority.to_string(),
            record.sentiment.to_string(),
            encode_list(record.topics.as_ref())?,
            encode_list(record.extracted_emails.as_ref())?,
            encode_list(record.extracted_phones.as_ref())?,
            record.ai_reply.clone().unwrap_or_default(),
            record.status.to_string(),
            record
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn encode_list(list: Option<&Vec<String>>) -> Result<String, serde_json::Error> {
    list.map(serde_json::to_string)
        .transpose()
        .map(Option::unwrap_or_default)
}
