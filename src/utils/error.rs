use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Data store not found: {}", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("Could not write backup {}: {source}", path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Required tables missing: {}", tables.join(", "))]
    MissingTables { tables: Vec<String> },

    #[error("No fragrances found in the data store")]
    NoFragrances,

    #[error("{label} spreadsheet not found in {}", dir.display())]
    MissingSourceFile { label: String, dir: PathBuf },

    #[error("Import of {sheet} failed: {source}")]
    SheetImport {
        sheet: String,
        #[source]
        source: Box<MaintError>,
    },

    #[error("Invalid cell in row {row}, column {column}: {message}")]
    InvalidCell {
        row: usize,
        column: usize,
        message: String,
    },

    #[error("Reference update failed, all changes rolled back: {source}")]
    RepairRolledBack {
        #[source]
        source: rusqlite::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Precondition,
    Source,
    Mutation,
    System,
}

impl MaintError {
    pub fn sheet_import(sheet: &str, source: MaintError) -> Self {
        MaintError::SheetImport {
            sheet: sheet.to_string(),
            source: Box::new(source),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MaintError::ConfigError { .. }
            | MaintError::InvalidConfigValueError { .. }
            | MaintError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MaintError::StoreNotFound { .. }
            | MaintError::MissingTables { .. }
            | MaintError::NoFragrances
            | MaintError::MissingSourceFile { .. } => ErrorCategory::Precondition,
            MaintError::SpreadsheetError(_)
            | MaintError::CsvError(_)
            | MaintError::InvalidCell { .. }
            | MaintError::SheetImport { .. } => ErrorCategory::Source,
            MaintError::DatabaseError(_) | MaintError::RepairRolledBack { .. } => {
                ErrorCategory::Mutation
            }
            MaintError::IoError(_) | MaintError::BackupFailed { .. } => ErrorCategory::System,
        }
    }

    /// Process exit code for a job that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Precondition
            | ErrorCategory::Source
            | ErrorCategory::Mutation
            | ErrorCategory::System => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MaintError::StoreNotFound { path } => {
                format!("The file {} does not exist.", path.display())
            }
            MaintError::MissingTables { tables } => format!(
                "The required tables {} were not found.",
                tables
                    .iter()
                    .map(|t| format!("'{}'", t))
                    .collect::<Vec<_>>()
                    .join(" and ")
            ),
            MaintError::MissingSourceFile { label, .. } => format!("{} not found.", label),
            MaintError::SheetImport { sheet, source } => {
                format!("Error while importing {}: {}", sheet, source)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command-line flags and the config file",
            ErrorCategory::Precondition => {
                "Check the database path and the export directory, then run the job again"
            }
            ErrorCategory::Source => {
                "Fix the spreadsheet export; restore the .backup copy if the store was already cleared"
            }
            ErrorCategory::Mutation => {
                "The store may be incomplete; restore the .backup copy written before the job"
            }
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, MaintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_non_zero() {
        assert_eq!(MaintError::NoFragrances.exit_code(), 1);
        assert_eq!(
            MaintError::ConfigError {
                message: "bad".to_string()
            }
            .exit_code(),
            2
        );
    }

    #[test]
    fn test_missing_tables_message_names_every_table() {
        let err = MaintError::MissingTables {
            tables: vec!["fragrances".to_string(), "composition_details".to_string()],
        };
        assert_eq!(
            err.user_friendly_message(),
            "The required tables 'fragrances' and 'composition_details' were not found."
        );
        assert_eq!(err.category(), ErrorCategory::Precondition);
    }

    #[test]
    fn test_sheet_import_wraps_source() {
        let err = MaintError::sheet_import(
            "compositions",
            MaintError::InvalidCell {
                row: 3,
                column: 2,
                message: "amount 'abc' is not a number".to_string(),
            },
        );
        assert_eq!(err.category(), ErrorCategory::Source);
        assert!(err.to_string().contains("compositions"));
        assert!(err.to_string().contains("abc"));
    }
}
