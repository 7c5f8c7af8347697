//! Mailbox sources feeding the pipeline.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use log::warn;

use super::error::{EmailError, Result};
use super::parser::parse_message;
use super::types::{RawEmail, SentDate};

/// A supplier of raw messages, e.g. a mailbox transport.
pub trait MailSource {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Returns messages sent within the last `days_back` days, or every
    /// available message when `days_back` is `None`.
    fn fetch_since(&mut self, days_back: Option<u32>) -> Result<Vec<RawEmail>>;
}

/// True when `email` falls inside the window. Messages without a usable
/// date are kept, since the window cannot rule them out.
pub fn within_window(email: &RawEmail, days_back: Option<u32>) -> bool {
    let Some(days) = days_back else {
        return true;
    };
    match SentDate::parse(&email.sent_date).and_then(|d| d.timestamp()) {
        Some(sent) => sent >= Utc::now() - Duration::days(i64::from(days)),
        None => true,
    }
}

/// Reads exported `.eml` files from a directory.
pub struct EmlDirectory {
    dir: PathBuf,
    name: String,
}

impl EmlDirectory {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let name = dir.display().to_string();
        Self { dir, name }
    }
}

impl MailSource for EmlDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_since(&mut self, days_back: Option<u32>) -> Result<Vec<RawEmail>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| EmailError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
            })
            .collect();
        paths.sort();

        let mut emails = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = std::fs::read(&path).map_err(|e| EmailError::Io {
                path: path.clone(),
                source: e,
            })?;
            match parse_message(&raw) {
                Ok(email) if within_window(&email, days_back) => emails.push(email),
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(emails)
    }
}
