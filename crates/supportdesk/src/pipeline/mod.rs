pub mod enrich;
pub mod error;
pub mod runner;

pub use enrich::{enrich_one, process_and_enrich};
pub use error::PipelineError;
pub use runner::{IngestReport, Pipeline};
