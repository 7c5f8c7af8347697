//! Email records and mailbox input.
//!
//! Holds the record types that flow through the enrichment pipeline and the
//! store, plus conversion of raw RFC 822 messages into pipeline input.

pub mod error;
pub mod parser;
pub mod source;
pub mod types;

pub use error::EmailError;
pub use parser::parse_message;
pub use source::{EmlDirectory, MailSource};
pub use types::{
    EmailRecord, EnrichedEmail, Priority, RawEmail, SentDate, Sentiment, Status, WorkflowWrite,
};
