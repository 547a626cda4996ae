use crate::domain::model::{DanglingCustomer, Fragrance, NewCustomer, NewFragrance};
use crate::domain::sheet::Sheet;
use crate::utils::error::Result;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Relational store holding the four perfumery tables.
pub trait Store {
    /// Names from `tables` that do not exist in the store.
    fn missing_tables(&self, tables: &[&str]) -> Result<Vec<String>>;

    /// All fragrances ordered by id.
    fn fragrances(&self) -> Result<Vec<Fragrance>>;

    /// Distinct non-null fragrance ids referenced by composition details.
    fn referenced_fragrance_ids(&self) -> Result<BTreeSet<i64>>;

    fn customer_ids(&self) -> Result<HashSet<i64>>;

    fn dangling_customers(&self) -> Result<Vec<DanglingCustomer>>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Deletes every row of the four tables and resets their id counters.
    fn clear_all(&mut self) -> Result<()>;

    fn insert_fragrance(&mut self, fragrance: &NewFragrance) -> Result<i64>;
    fn insert_customer(&mut self, customer: &NewCustomer) -> Result<i64>;
    fn insert_composition(&mut self, customer_id: i64, name: &str) -> Result<i64>;
    fn insert_composition_detail(
        &mut self,
        composition_id: i64,
        fragrance_id: i64,
        amount: f64,
    ) -> Result<i64>;
    fn update_composition_total(&mut self, composition_id: i64, total: f64) -> Result<()>;

    /// Points every composition detail referencing `from` at `to`; returns the
    /// number of rows changed.
    fn remap_fragrance_reference(&mut self, from: i64, to: i64) -> Result<usize>;
}

/// Reads the first worksheet of a spreadsheet file.
pub trait SheetSource {
    fn read_sheet(&self, path: &Path) -> Result<Sheet>;
}

/// A batch job run by [`crate::core::runner::JobRunner`].
pub trait MaintenanceJob {
    type Report: std::fmt::Display;

    fn name(&self) -> &'static str;

    /// Store file the job works on.
    fn store_path(&self) -> &Path;

    /// Checks that must pass before the snapshot is taken.
    fn preflight(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether the job mutates the store and needs a backup first.
    fn needs_snapshot(&self) -> bool {
        true
    }

    fn execute(&mut self) -> Result<Self::Report>;
}
