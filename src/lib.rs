pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{FileSheetSource, SqliteStore};
pub use app::jobs::{AuditJob, ReimportJob, RepairJob};
pub use crate::core::import::ImportOptions;
pub use crate::core::runner::{JobOutcome, JobRunner};
pub use utils::error::{MaintError, Result};
