//! Test harness running the bootstrap pipeline against a file-backed
//! database in a temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use cmsboot::pipeline::NoopProgress;
use cmsboot::{BootstrapDocument, BootstrapError, Database, Pipeline, PipelineConfig, RunSummary};

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
    pipeline: Pipeline,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("cmsboot.db");
        let db = Database::open(&db_path).expect("Failed to open database");
        Self {
            temp_dir,
            db_path,
            db,
            pipeline: Pipeline::from_config(Arc::new(PipelineConfig::default())),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a source file into the temp directory.
    pub fn write_source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write source");
        path
    }

    pub fn bootstrap(
        &self,
        documents: &[BootstrapDocument],
    ) -> Result<Vec<RunSummary>, BootstrapError> {
        self.pipeline.bootstrap(&self.db, documents, &NoopProgress)
    }

    /// Row count of a table.
    pub fn count(&self, table: &str) -> u32 {
        self.db
            .with_conn(|conn| {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                    r.get(0)
                })?)
            })
            .expect("Failed to count rows")
    }

    /// Row counts of every table the pipeline writes to.
    pub fn snapshot(&self) -> Vec<(&'static str, u32)> {
        [
            "users",
            "auth_groups",
            "user_groups",
            "user_permissions",
            "group_permissions",
            "pages",
            "page_contents",
            "versions",
            "placeholders",
            "plugins",
            "page_user_assignments",
            "moderation_roles",
            "workflows",
            "workflow_steps",
            "moderation_collections",
            "moderation_requests",
        ]
        .into_iter()
        .map(|table| (table, self.count(table)))
        .collect()
    }
}
