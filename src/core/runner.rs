use crate::core::snapshot;
use crate::domain::ports::MaintenanceJob;
use crate::utils::error::Result;
use crate::utils::validation::validate_existing_file;
use std::path::PathBuf;

#[derive(Debug)]
pub struct JobOutcome<T> {
    pub report: T,
    /// Backup written before the job mutated the store.
    pub backup: Option<PathBuf>,
}

/// Runs a job through the fixed sequence: store check, preflight, snapshot,
/// execute.
pub struct JobRunner<J: MaintenanceJob> {
    job: J,
}

impl<J: MaintenanceJob> JobRunner<J> {
    pub fn new(job: J) -> Self {
        Self { job }
    }

    pub fn run(mut self) -> Result<JobOutcome<J::Report>> {
        tracing::info!("Starting {}...", self.job.name());

        let store_path = self.job.store_path().to_path_buf();
        validate_existing_file("store.path", &store_path)
            .inspect_err(|e| tracing::error!("Cannot use {}: {}", store_path.display(), e))?;

        self.job.preflight()?;

        let backup = if self.job.needs_snapshot() {
            Some(snapshot::snapshot(&store_path)?)
        } else {
            None
        };

        tracing::info!("Connecting to the database...");
        let report = self.job.execute()?;
        tracing::info!("{} finished: {}", self.job.name(), report);

        if let Some(path) = &backup {
            tracing::info!("A backup of the original database was saved at {}.", path.display());
        }

        Ok(JobOutcome { report, backup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MaintError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct RecordingJob {
        store: PathBuf,
        mutating: bool,
        fail_preflight: bool,
        executed: bool,
    }

    impl MaintenanceJob for RecordingJob {
        type Report = String;

        fn name(&self) -> &'static str {
            "recording job"
        }

        fn store_path(&self) -> &Path {
            &self.store
        }

        fn preflight(&mut self) -> Result<()> {
            if self.fail_preflight {
                return Err(MaintError::MissingSourceFile {
                    label: "Kunden.xlsx".to_string(),
                    dir: PathBuf::from("."),
                });
            }
            Ok(())
        }

        fn needs_snapshot(&self) -> bool {
            self.mutating
        }

        fn execute(&mut self) -> Result<String> {
            self.executed = true;
            fs::write(&self.store, b"mutated")?;
            Ok("done".to_string())
        }
    }

    fn job(dir: &TempDir, mutating: bool, fail_preflight: bool) -> RecordingJob {
        let store = dir.path().join("parfumerie.db");
        fs::write(&store, b"original").unwrap();
        RecordingJob {
            store,
            mutating,
            fail_preflight,
            executed: false,
        }
    }

    #[test]
    fn test_snapshot_taken_before_execute() {
        let dir = TempDir::new().unwrap();
        let outcome = JobRunner::new(job(&dir, true, false)).run().unwrap();

        let backup = outcome.backup.unwrap();
        assert_eq!(fs::read(backup).unwrap(), b"original");
        assert_eq!(fs::read(dir.path().join("parfumerie.db")).unwrap(), b"mutated");
        assert_eq!(outcome.report, "done");
    }

    #[test]
    fn test_read_only_job_skips_snapshot() {
        let dir = TempDir::new().unwrap();
        let outcome = JobRunner::new(job(&dir, false, false)).run().unwrap();
        assert!(outcome.backup.is_none());
        assert!(!dir.path().join("parfumerie.db.backup").exists());
    }

    #[test]
    fn test_preflight_failure_stops_before_snapshot() {
        let dir = TempDir::new().unwrap();
        let result = JobRunner::new(job(&dir, true, true)).run();

        assert!(matches!(result, Err(MaintError::MissingSourceFile { .. })));
        assert!(!dir.path().join("parfumerie.db.backup").exists());
    }

    #[test]
    fn test_missing_store() {
        let dir = TempDir::new().unwrap();
        let mut job = job(&dir, true, false);
        job.store = dir.path().join("missing.db");

        let result = JobRunner::new(job).run();
        assert!(matches!(result, Err(MaintError::StoreNotFound { .. })));
    }

    #[test]
    fn test_directory_is_not_a_store() {
        let dir = TempDir::new().unwrap();
        let mut job = job(&dir, true, false);
        job.store = dir.path().to_path_buf();

        let result = JobRunner::new(job).run();
        assert!(matches!(result, Err(MaintError::StoreNotFound { .. })));
    }

    #[test]
    fn test_empty_store_path_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let mut job = job(&dir, true, false);
        job.store = PathBuf::new();

        let err = JobRunner::new(job).run().unwrap_err();
        assert!(matches!(err, MaintError::InvalidConfigValueError { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
