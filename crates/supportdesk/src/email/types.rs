//! Record types shared by the pipeline, the store and the reply workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A record as read from an input file or mailbox, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmail {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Unparsed date text. Blank means the source had no date.
    pub sent_date: String,
}

impl RawEmail {
    pub fn new(sender: &str, subject: &str, body: &str, sent_date: &str) -> Self {
        Self {
            sender: sender.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            sent_date: sent_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Urgent")]
    Urgent,
    #[serde(rename = "Not urgent")]
    NotUrgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::NotUrgent => "Not urgent",
        }
    }

    /// Decodes a stored label. Anything other than "Urgent" is not urgent.
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("urgent") {
            Priority::Urgent
        } else {
            Priority::NotUrgent
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Workflow state of a stored email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Resolved => "Resolved",
        }
    }

    /// Decodes a stored label, treating unknown text as `Pending`.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "resolved" => Ok(Status::Resolved),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Naive layouts accepted for sent dates, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Sent time of an email. Text that cannot be read as a timestamp is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SentDate {
    Parsed(DateTime<Utc>),
    Unparsed(String),
}

impl SentDate {
    /// Parses free-form date text. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match parse_timestamp(raw) {
            Some(ts) => SentDate::Parsed(ts),
            None => SentDate::Unparsed(raw.to_string()),
        })
    }

    /// Text form written to the store and used for natural-key matching.
    pub fn to_storage(&self) -> String {
        match self {
            SentDate::Parsed(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            SentDate::Unparsed(raw) => raw.clone(),
        }
    }

    /// Inverse of [`SentDate::to_storage`].
    pub fn from_storage(stored: &str) -> Self {
        match DateTime::parse_from_rfc3339(stored) {
            Ok(ts) => SentDate::Parsed(ts.with_timezone(&Utc)),
            Err(_) => SentDate::Unparsed(stored.to_string()),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SentDate::Parsed(ts) => Some(*ts),
            SentDate::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for SentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// How an upsert treats `ai_reply` and `status` when the natural key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowWrite {
    /// Applied only when a new row is created; existing rows keep their values.
    #[default]
    InitialOnly,
    /// Written to existing rows as given, including an explicit `None` reply.
    Overwrite,
}

/// Pipeline output and upsert input.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEmail {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub sent_date: Option<SentDate>,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub topics: Option<Vec<String>>,
    pub extracted_emails: Option<Vec<String>>,
    pub extracted_phones: Option<Vec<String>>,
    pub ai_reply: Option<String>,
    pub status: Status,
    pub workflow: WorkflowWrite,
}

impl EnrichedEmail {
    /// Marks the workflow fields as explicitly supplied by the caller.
    pub fn with_workflow(mut self, ai_reply: Option<String>, status: Status) -> Self {
        self.ai_reply = ai_reply;
        self.status = status;
        self.workflow = WorkflowWrite::Overwrite;
        self
    }
}

/// A row of the `emails` table.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRecord {
    pub id: i64,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub sent_date: Option<SentDate>,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub topics: Option<Vec<String>>,
    pub extracted_emails: Option<Vec<String>>,
    pub extracted_phones: Option<Vec<String>>,
    pub ai_reply: Option<String>,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

impl EmailRecord {
    /// Converts the row back into upsert input carrying its current values.
    pub fn to_enriched(&self) -> EnrichedEmail {
        EnrichedEmail {
            sender: self.sender.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            sent_date: self.sent_date.clone(),
            priority: self.priority,
            sentiment: self.sentiment,
            topics: self.topics.clone(),
            extracted_emails: self.extracted_emails.clone(),
            extracted_phones: self.extracted_phones.clone(),
            ai_reply: self.ai_reply.clone(),
            status: self.status,
            workflow: WorkflowWrite::InitialOnly,
        }
    }
}
