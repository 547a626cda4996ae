//! Bulk reimport of fragrances, customers and compositions from spreadsheet
//! exports into an emptied store.

use crate::core::columns::CustomerColumns;
use crate::core::locate::SourceFiles;
use crate::domain::model::{CompositionStats, Fragrance, ImportReport, NewFragrance};
use crate::domain::ports::{SheetSource, Store};
use crate::domain::sheet::Sheet;
use crate::utils::error::{MaintError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Wrap clearing and all three sheet imports in one transaction. Off by
    /// default: each statement then commits on its own and a failure halfway
    /// leaves a partially imported store, recoverable only from the backup.
    pub atomic: bool,
}

/// Lookup of fragrance identifiers used in the composition sheet.
#[derive(Debug, Clone, Default)]
pub struct FragranceIndex {
    by_code: HashMap<String, i64>,
    by_name: HashMap<String, i64>,
    numeric_codes: Vec<(i64, i64)>,
}

impl FragranceIndex {
    /// Builds the index from fragrances in id order. With duplicate codes or
    /// names the later fragrance wins the exact lookup.
    pub fn new(fragrances: &[Fragrance]) -> Self {
        let mut index = Self::default();
        for fragrance in fragrances {
            if !fragrance.code.is_empty() {
                index.by_code.insert(fragrance.code.clone(), fragrance.id);
                if let Ok(number) = fragrance.code.trim().parse::<i64>() {
                    index.numeric_codes.push((number, fragrance.id));
                }
            }
            if !fragrance.name.is_empty() {
                index.by_name.insert(fragrance.name.clone(), fragrance.id);
            }
        }
        index
    }

    /// Exact code, then exact name, then the first fragrance whose code is
    /// numerically equal to the identifier.
    pub fn resolve(&self, identifier: &str) -> Option<i64> {
        if let Some(&id) = self.by_code.get(identifier) {
            return Some(id);
        }
        if let Some(&id) = self.by_name.get(identifier) {
            return Some(id);
        }
        let number = identifier.trim().parse::<i64>().ok()?;
        self.numeric_codes
            .iter()
            .find(|(code, _)| *code == number)
            .map(|&(_, id)| id)
    }
}

/// Column 1 is the name, column 2 the code. Returns the number of rows
/// imported.
pub fn import_fragrances<S: Store>(store: &mut S, sheet: &Sheet) -> Result<usize> {
    for row in 0..sheet.len() {
        let fragrance = NewFragrance {
            name: sheet.cell(row, 0).to_text(),
            code: sheet.cell(row, 1).to_text(),
            description: String::new(),
        };
        store.insert_fragrance(&fragrance)?;
    }
    tracing::info!("{} fragrances imported.", sheet.len());
    Ok(sheet.len())
}

pub fn import_customers<S: Store>(store: &mut S, sheet: &Sheet) -> Result<usize> {
    let columns = CustomerColumns::resolve(&sheet.headers);
    let unmapped = columns.unmapped();
    if !unmapped.is_empty() {
        tracing::debug!("Customer fields without a column: {:?}", unmapped);
    }

    for row in 0..sheet.len() {
        store.insert_customer(&columns.customer(sheet, row))?;
    }
    tracing::info!("{} customers imported.", sheet.len());
    Ok(sheet.len())
}

/// Each row is a customer id followed by (fragrance, amount) pairs. Rows for
/// unknown customers and unusable pairs are skipped with a warning.
pub fn import_compositions<S: Store>(store: &mut S, sheet: &Sheet) -> Result<CompositionStats> {
    let customer_ids = store.customer_ids()?;
    let fragrances = FragranceIndex::new(&store.fragrances()?);
    let width = sheet.width();

    let mut stats = CompositionStats {
        rows_read: sheet.len(),
        ..Default::default()
    };

    for row in 0..sheet.len() {
        let reference = sheet.cell(row, 0);
        let customer_id = match reference.as_integer().filter(|id| customer_ids.contains(id)) {
            Some(id) => id,
            None => {
                tracing::warn!(
                    "Customer with ID '{}' not found, skipping composition.",
                    reference.to_text()
                );
                stats.rows_skipped += 1;
                continue;
            }
        };

        let composition_id = store.insert_composition(customer_id, "")?;
        stats.compositions_created += 1;

        let mut total_amount = 0.0;
        for column in (1..width).step_by(2) {
            if column + 1 >= width {
                break;
            }

            let identifier = sheet.cell(row, column).to_text();
            let amount = sheet.amount(row, column + 1)?;

            if identifier.is_empty() {
                continue;
            }
            if amount <= 0.0 {
                tracing::warn!(
                    "Fragrance '{}' has no positive amount ({}), skipping.",
                    identifier,
                    amount
                );
                stats.pairs_skipped += 1;
                continue;
            }

            let Some(fragrance_id) = fragrances.resolve(&identifier) else {
                tracing::warn!("Fragrance '{}' not found, skipping.", identifier);
                stats.pairs_skipped += 1;
                continue;
            };

            store.insert_composition_detail(composition_id, fragrance_id, amount)?;
            stats.details_created += 1;
            total_amount += amount;
        }

        store.update_composition_total(composition_id, total_amount)?;
    }

    tracing::info!(
        "{} compositions imported ({} rows skipped).",
        stats.compositions_created,
        stats.rows_skipped
    );
    Ok(stats)
}

/// Clears the store and imports the three exports in dependency order:
/// fragrances, customers, compositions.
pub fn reimport<S: Store, R: SheetSource>(
    store: &mut S,
    reader: &R,
    files: &SourceFiles,
    options: ImportOptions,
) -> Result<ImportReport> {
    if !options.atomic {
        return load_all(store, reader, files);
    }

    store.begin()?;
    match load_all(store, reader, files) {
        Ok(report) => {
            store.commit()?;
            Ok(report)
        }
        Err(e) => {
            if let Err(rollback_error) = store.rollback() {
                tracing::error!("Rollback failed: {}", rollback_error);
            } else {
                tracing::warn!("Import rolled back; the store is unchanged.");
            }
            Err(e)
        }
    }
}

fn load_all<S: Store, R: SheetSource>(
    store: &mut S,
    reader: &R,
    files: &SourceFiles,
) -> Result<ImportReport> {
    tracing::info!("Clearing tables...");
    store.clear_all()?;

    tracing::info!("Importing fragrances...");
    let fragrances = reader
        .read_sheet(&files.fragrances)
        .and_then(|sheet| import_fragrances(store, &sheet))
        .map_err(|e| MaintError::sheet_import("fragrances", e))?;

    tracing::info!("Importing customers...");
    let customers = reader
        .read_sheet(&files.customers)
        .and_then(|sheet| import_customers(store, &sheet))
        .map_err(|e| MaintError::sheet_import("customers", e))?;

    tracing::info!("Importing compositions...");
    let compositions = reader
        .read_sheet(&files.compositions)
        .and_then(|sheet| import_compositions(store, &sheet))
        .map_err(|e| MaintError::sheet_import("compositions", e))?;

    Ok(ImportReport {
        fragrances,
        customers,
        compositions,
    })
}
