//! Builders for test inputs.

#![allow(dead_code)]

use supportdesk::email::RawEmail;

/// Builder for `RawEmail` with admissible defaults.
pub struct RawEmailBuilder {
    sender: String,
    subject: String,
    body: String,
    sent_date: String,
}

impl RawEmailBuilder {
    pub fn new() -> Self {
        Self {
            sender: "customer@example.com".to_string(),
            subject: "Support request".to_string(),
            body: "Hello team".to_string(),
            sent_date: "2025-08-18 09:30:00".to_string(),
        }
    }

    pub fn sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn sent_date(mut self, sent_date: &str) -> Self {
        self.sent_date = sent_date.to_string();
        self
    }

    pub fn build(self) -> RawEmail {
        RawEmail {
            sender: self.sender,
            subject: self.subject,
            body: self.body,
            sent_date: self.sent_date,
        }
    }
}

impl Default for RawEmailBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for CSV input text with the standard header.
pub struct CsvBuilder {
    header: String,
    rows: Vec<String>,
}

impl CsvBuilder {
    pub fn new() -> Self {
        Self::with_header("sender,subject,body,sent_date")
    }

    pub fn with_header(header: &str) -> Self {
        Self {
            header: header.to_string(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; fields are quoted as needed.
    pub fn row(mut self, fields: &[&str]) -> Self {
        let line = fields
            .iter()
            .map(|f| {
                if f.contains(',') || f.contains('"') || f.contains('\n') {
                    format!("\"{}\"", f.replace('"', "\"\""))
                } else {
                    f.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        self.rows.push(line);
        self
    }

    pub fn build(self) -> String {
        let mut out = self.header;
        out.push('\n');
        for row in self.rows {
            out.push_str(&row);
            out.push('\n');
        }
        out
    }
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
