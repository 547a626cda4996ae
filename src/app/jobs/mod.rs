pub mod audit_job;
pub mod reimport_job;
pub mod repair_job;

pub use audit_job::AuditJob;
pub use reimport_job::ReimportJob;
pub use repair_job::RepairJob;
