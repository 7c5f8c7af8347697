//! Tabular input: CSV uploads normalized into [`RawEmail`] records.
//!
//! Column lookup happens once per file. A missing column becomes empty text
//! for every row and invalid UTF-8 is replaced, so only an unreadable file is
//! an error.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, Trim};
use log::warn;
use thiserror::Error;

use crate::email::RawEmail;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read input file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV header: {0}")]
    Csv(#[from] csv::Error),
}

/// Accepted header names per field, compared case-insensitively.
const SENDER_HEADERS: &[&str] = &["sender", "from"];
const SUBJECT_HEADERS: &[&str] = &["subject"];
const BODY_HEADERS: &[&str] = &["body", "message"];
const SENT_DATE_HEADERS: &[&str] = &["sent_date", "date", "sent_at"];

/// Column positions of the four input fields in one file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    sender: Option<usize>,
    subject: Option<usize>,
    body: Option<usize>,
    sent_date: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &ByteRecord) -> Self {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = String::from_utf8_lossy(h);
                names.iter().any(|n| h.trim().eq_ignore_ascii_case(n))
            })
        };
        Self {
            sender: find(SENDER_HEADERS),
            subject: find(SUBJECT_HEADERS),
            body: find(BODY_HEADERS),
            sent_date: find(SENT_DATE_HEADERS),
        }
    }

    fn normalize(&self, record: &ByteRecord) -> RawEmail {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };
        RawEmail {
            sender: field(self.sender),
            subject: field(self.subject),
            body: field(self.body),
            sent_date: field(self.sent_date),
        }
    }
}

/// Reads a CSV file from disk.
pub fn read_csv_path(path: &Path) -> Result<Vec<RawEmail>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_csv(file)
}

/// Reads header-named CSV into raw records, in file order.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawEmail>, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers);
    if layout.subject.is_none() {
        warn!("Input has no subject column; every row will fail the subject filter");
    }

    let mut emails = Vec::new();
    for (idx, result) in rdr.byte_records().enumerate() {
        match result {
            Ok(record) => emails.push(layout.normalize(&record)),
            // Header is line 1.
            Err(e) => warn!("Skipping unreadable CSV row {}: {}", idx + 2, e),
        }
    }
    Ok(emails)
}
