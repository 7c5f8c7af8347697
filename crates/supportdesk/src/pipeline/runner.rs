use std::path::Path;

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::db::{email_repo, Database, DatabaseError, EmailFilter, FieldUpdate, UpsertSummary};
use crate::email::{parse_message, MailSource, RawEmail, Status};
use crate::ingest;
use crate::reply::SharedReplyGenerator;
use crate::sanitize;

use super::enrich::process_and_enrich;
use super::error::PipelineError;

/// Outcome of one ingest run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub read: usize,
    pub admitted: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Store plus reply generator: everything the workflow actions need.
pub struct Pipeline {
    db: Database,
    replier: SharedReplyGenerator,
}

impl Pipeline {
    pub fn new(db: Database, replier: SharedReplyGenerator) -> Self {
        Self { db, replier }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn replier_name(&self) -> &'static str {
        self.replier.name()
    }

    /// Enriches `raw` and merges the admitted emails into the store.
    pub fn ingest_batch(&self, raw: Vec<RawEmail>) -> Result<IngestReport, PipelineError> {
        let read = raw.len();
        let enriched = process_and_enrich(raw);
        let admitted = enriched.len();

        let UpsertSummary { inserted, updated } = email_repo::upsert(&self.db, &enriched)?;

        let report = IngestReport {
            read,
            admitted,
            inserted,
            updated,
        };
        info!(read, admitted, inserted, updated, "Ingest complete");
        Ok(report)
    }

    pub fn ingest_csv(&self, path: &Path) -> Result<IngestReport, PipelineError> {
        let _span = info_span!("ingest_csv", file = %path.display()).entered();
        let raw = ingest::read_csv_path(path)?;
        self.ingest_batch(raw)
    }

    /// Ingests raw RFC 822 messages. Undecodable messages are skipped.
    pub fn ingest_messages<M: AsRef<[u8]>>(
        &self,
        messages: &[M],
    ) -> Result<IngestReport, PipelineError> {
        let _span = info_span!("ingest_messages", count = messages.len()).entered();
        let raw: Vec<RawEmail> = messages
            .iter()
            .enumerate()
            .filter_map(|(idx, bytes)| match parse_message(bytes.as_ref()) {
                Ok(email) => Some(email),
                Err(e) => {
                    warn!(index = idx, error = %e, "Skipping undecodable message");
                    None
                }
            })
            .collect();
        self.ingest_batch(raw)
    }

    pub fn ingest_source(
        &self,
        source: &mut dyn MailSource,
        days_back: Option<u32>,
    ) -> Result<IngestReport, PipelineError> {
        let _span = info_span!("ingest_source", source = source.name()).entered();
        let raw = source.fetch_since(days_back)?;
        self.ingest_batch(raw)
    }

    /// Drafts a reply for one stored email, saves it and puts the email
    /// back to `Pending`.
    pub fn generate_reply(&self, id: i64) -> Result<String, PipelineError> {
        let record =
            email_repo::find_by_id(&self.db, id)?.ok_or(DatabaseError::NotFound { id })?;

        let _span = info_span!(
            "generate_reply",
            id,
            sender = %sanitize::redact_sender(&record.sender),
            sender_hash = %sanitize::hash_sender(&record.sender),
            generator = self.replier.name(),
        )
        .entered();

        let reply = self.replier.generate(&record.subject, &record.body);
        email_repo::update_fields(
            &self.db,
            id,
            &FieldUpdate {
                ai_reply: Some(reply.clone()),
                status: Some(Status::Pending),
            },
        )?;
        Ok(reply)
    }

    /// Stores an edited reply. Status is left alone.
    pub fn save_reply(&self, id: i64, text: &str) -> Result<(), PipelineError> {
        email_repo::update_fields(&self.db, id, &FieldUpdate::reply(text))?;
        Ok(())
    }

    pub fn resolve(&self, id: i64) -> Result<(), PipelineError> {
        email_repo::update_fields(&self.db, id, &FieldUpdate::status(Status::Resolved))?;
        info!(id, "Email resolved");
        Ok(())
    }

    /// Regenerates replies for every stored email (optionally only those with
    /// `status`) and writes them through upsert, resetting status to `Pending`.
    pub fn regenerate_all(&self, status: Option<Status>) -> Result<UpsertSummary, PipelineError> {
        let records = email_repo::list(
            &self.db,
            &EmailFilter {
                status,
                ..EmailFilter::default()
            },
        )?;

        let _span = info_span!(
            "regenerate_all",
            count = records.len(),
            generator = self.replier.name()
        )
        .entered();

        let batch: Vec<_> = records
            .iter()
            .map(|record| {
                let reply = self.replier.generate(&record.subject, &record.body);
                record.to_enriched().with_workflow(Some(reply), Status::Pending)
            })
            .collect();

        let summary = email_repo::upsert(&self.db, &batch)?;
        info!(regenerated = summary.updated, "Replies regenerated");
        Ok(summary)
    }
}
