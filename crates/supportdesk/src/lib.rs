pub mod classifier;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod reply;
pub mod sanitize;
pub mod secrets;

pub use classifier::{classify, summarize, Classification};
pub use config::{load_config, AppConfig, ReplyProvider};
pub use db::{ensure_store, Database, DatabaseError, EmailFilter, FieldUpdate, UpsertSummary};
pub use email::{
    EmailRecord, EnrichedEmail, MailSource, Priority, RawEmail, SentDate, Sentiment, Status,
    WorkflowWrite,
};
pub use error::{ConfigError, Result, SupportDeskError};
pub use pipeline::{process_and_enrich, IngestReport, Pipeline, PipelineError};
pub use reply::{ReplyGenerator, SharedReplyGenerator, TemplateReplier};
pub use secrets::{SecretError, SecretSource};
