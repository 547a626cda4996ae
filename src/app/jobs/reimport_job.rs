use crate::adapters::{FileSheetSource, SqliteStore};
use crate::core::import::{self, ImportOptions};
use crate::core::locate::{self, SourceFiles};
use crate::domain::model::ImportReport;
use crate::domain::ports::MaintenanceJob;
use crate::utils::error::Result;
use crate::utils::validation::{validate_directory, validate_required_field};
use std::path::{Path, PathBuf};

/// Wipe-and-reload of a SQLite store from the spreadsheet exports in
/// `source_dir`.
pub struct ReimportJob {
    store_path: PathBuf,
    source_dir: PathBuf,
    options: ImportOptions,
    sources: Option<SourceFiles>,
}

impl ReimportJob {
    pub fn new(store_path: PathBuf, source_dir: PathBuf) -> Self {
        Self {
            store_path,
            source_dir,
            options: ImportOptions::default(),
            sources: None,
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

impl MaintenanceJob for ReimportJob {
    type Report = ImportReport;

    fn name(&self) -> &'static str {
        "reimport"
    }

    fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn preflight(&mut self) -> Result<()> {
        validate_directory("import.directory", &self.source_dir)?;
        let sources = locate::locate_sources(&self.source_dir)?;
        tracing::debug!("Using source files: {:?}", sources);
        self.sources = Some(sources);
        Ok(())
    }

    fn execute(&mut self) -> Result<ImportReport> {
        let sources = validate_required_field("import.sources", &self.sources)?;

        if !self.options.atomic {
            tracing::debug!("Importing without a surrounding transaction");
        }

        let mut store = SqliteStore::open(&self.store_path)?;
        import::reimport(&mut store, &FileSheetSource::new(), sources, self.options)
    }
}
