pub mod jobs;

use crate::core::runner::JobOutcome;
use crate::utils::error::Result;
use std::fmt::Display;

/// Reports the result of a job run and returns the process exit code.
pub fn finish<T: Display>(result: Result<JobOutcome<T>>) -> i32 {
    match result {
        Ok(outcome) => {
            println!("✅ {}", outcome.report);
            if let Some(backup) = outcome.backup {
                println!("📁 Backup of the original database: {}", backup.display());
            }
            0
        }
        Err(e) => {
            tracing::error!("❌ Job failed: {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    }
}
