//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temp directory holding a file-backed store and
//! any input files a test writes, plus a pipeline wired to the offline
//! reply template.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use supportdesk::db::{email_repo, Database};
use supportdesk::email::EmailRecord;
use supportdesk::pipeline::Pipeline;
use supportdesk::reply::TemplateReplier;

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub pipeline: Pipeline,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("emails.db");
        let db = supportdesk::ensure_store(&db_path).expect("Failed to open store");
        let pipeline = Pipeline::new(db, Arc::new(TemplateReplier));

        Self {
            temp_dir,
            db_path,
            pipeline,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn db(&self) -> &Database {
        self.pipeline.database()
    }

    /// Opens a second handle on the same store file.
    pub fn reopen(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to reopen store")
    }

    pub fn write_file(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn records(&self) -> Vec<EmailRecord> {
        email_repo::load_all(self.db()).expect("Failed to load records")
    }

    pub fn record(&self, id: i64) -> EmailRecord {
        email_repo::find_by_id(self.db(), id)
            .expect("Failed to query record")
            .expect("Record not found")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
