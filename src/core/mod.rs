pub mod columns;
pub mod import;
pub mod locate;
pub mod reconcile;
pub mod runner;
pub mod snapshot;

pub use crate::domain::model::{ImportReport, RepairReport};
pub use crate::domain::ports::{MaintenanceJob, SheetSource, Store};
pub use crate::utils::error::Result;
