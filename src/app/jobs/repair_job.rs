use crate::adapters::SqliteStore;
use crate::core::reconcile;
use crate::domain::model::RepairReport;
use crate::domain::ports::MaintenanceJob;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Reference repair against a SQLite store file.
pub struct RepairJob {
    store_path: PathBuf,
    dry_run: bool,
}

impl RepairJob {
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path,
            dry_run: false,
        }
    }

    /// Plan and log the remapping without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl MaintenanceJob for RepairJob {
    type Report = RepairReport;

    fn name(&self) -> &'static str {
        "reference repair"
    }

    fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn needs_snapshot(&self) -> bool {
        !self.dry_run
    }

    fn execute(&mut self) -> Result<RepairReport> {
        let mut store = SqliteStore::open(&self.store_path)?;
        reconcile::repair_references(&mut store, self.dry_run)
    }
}
