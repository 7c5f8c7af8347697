use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Ingest failed: {0}")]
    Ingest(#[from] crate::ingest::IngestError),

    #[error("Mail source failed: {0}")]
    Email(#[from] crate::email::EmailError),

    #[error("Store operation failed: {0}")]
    Database(#[from] crate::db::DatabaseError),
}
