pub mod sheets;
pub mod sqlite;

pub use sheets::FileSheetSource;
pub use sqlite::SqliteStore;
