use crate::adapters::SqliteStore;
use crate::adapters::sqlite::{COMPOSITIONS, COMPOSITION_DETAILS, CUSTOMERS, FRAGRANCES};
use crate::domain::model::AuditReport;
use crate::domain::ports::{MaintenanceJob, Store};
use crate::utils::error::{MaintError, Result};
use std::path::{Path, PathBuf};

/// Read-only listing of customers whose compositions reference missing
/// fragrances.
pub struct AuditJob {
    store_path: PathBuf,
}

impl AuditJob {
    pub fn new(store_path: PathBuf) -> Self {
        Self { store_path }
    }
}

impl MaintenanceJob for AuditJob {
    type Report = AuditReport;

    fn name(&self) -> &'static str {
        "reference audit"
    }

    fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn needs_snapshot(&self) -> bool {
        false
    }

    fn execute(&mut self) -> Result<AuditReport> {
        let store = SqliteStore::open(&self.store_path)?;
        let missing =
            store.missing_tables(&[CUSTOMERS, FRAGRANCES, COMPOSITIONS, COMPOSITION_DETAILS])?;
        if !missing.is_empty() {
            return Err(MaintError::MissingTables { tables: missing });
        }

        let customers = store.dangling_customers()?;
        for customer in &customers {
            tracing::warn!(
                "Customer {} ({} {}) has {} composition details without a fragrance.",
                customer.customer_id,
                customer.first_name,
                customer.last_name,
                customer.broken_details
            );
        }
        Ok(AuditReport { customers })
    }
}
