//! Repair of composition details whose fragrance reference points nowhere.
//!
//! Invalid ids are resolved in a fixed order: the id itself if it exists, the
//! id shifted by [`HISTORICAL_ID_SHIFT`], and finally the lowest fragrance id.
//! The order matters more than the quality of the match; do not reorder.

use crate::adapters::sqlite::{COMPOSITION_DETAILS, FRAGRANCES};
use crate::domain::model::{Fragrance, IdMapping, MatchStrategy, RepairReport};
use crate::domain::ports::Store;
use crate::utils::error::{MaintError, Result};
use std::collections::{BTreeSet, HashMap};

/// Offset introduced by an old migration that renumbered fragrances.
pub const HISTORICAL_ID_SHIFT: i64 = 60;

/// Below this share of coded fragrances a data-quality warning is logged.
pub const CODE_COVERAGE_THRESHOLD: f64 = 0.8;

/// Resolves one invalid reference against the set of valid ids. Returns
/// `None` only when `valid` is empty.
pub fn resolve_reference(invalid_id: i64, valid: &BTreeSet<i64>) -> Option<IdMapping> {
    if valid.contains(&invalid_id) {
        return Some(IdMapping {
            from: invalid_id,
            to: invalid_id,
            strategy: MatchStrategy::Exact,
        });
    }

    let shifted = invalid_id.checked_add(HISTORICAL_ID_SHIFT);
    if let Some(candidate) = shifted.filter(|c| valid.contains(c)) {
        return Some(IdMapping {
            from: invalid_id,
            to: candidate,
            strategy: MatchStrategy::Offset,
        });
    }

    valid.first().map(|&lowest| IdMapping {
        from: invalid_id,
        to: lowest,
        strategy: MatchStrategy::Fallback,
    })
}

/// Mappings for every referenced id that is not a valid fragrance id, in
/// ascending order of the invalid id.
pub fn plan_repair(valid: &BTreeSet<i64>, referenced: &BTreeSet<i64>) -> Vec<IdMapping> {
    referenced
        .difference(valid)
        .filter_map(|&id| resolve_reference(id, valid))
        .collect()
}

/// True when fewer than 80% of the fragrances carry a (distinct) code.
pub fn code_coverage_is_low(fragrances: &[Fragrance]) -> bool {
    let code_to_id: HashMap<&str, i64> = fragrances
        .iter()
        .filter(|f| !f.code.is_empty())
        .map(|f| (f.code.as_str(), f.id))
        .collect();
    (code_to_id.len() as f64) < fragrances.len() as f64 * CODE_COVERAGE_THRESHOLD
}

/// Detects and rewrites invalid fragrance references. All updates run in a
/// single transaction; a failure rolls every one of them back.
pub fn repair_references<S: Store>(store: &mut S, dry_run: bool) -> Result<RepairReport> {
    let missing = store.missing_tables(&[FRAGRANCES, COMPOSITION_DETAILS])?;
    if !missing.is_empty() {
        return Err(MaintError::MissingTables { tables: missing });
    }

    tracing::info!("Loading fragrances from the database...");
    let fragrances = store.fragrances()?;
    if fragrances.is_empty() {
        return Err(MaintError::NoFragrances);
    }
    tracing::info!("{} fragrances found.", fragrances.len());

    tracing::info!("Checking references in composition_details...");
    let valid: BTreeSet<i64> = fragrances.iter().map(|f| f.id).collect();
    let referenced = store.referenced_fragrance_ids()?;
    let invalid_ids: Vec<i64> = referenced.difference(&valid).copied().collect();

    let mut report = RepairReport {
        fragrance_count: fragrances.len(),
        dry_run,
        ..Default::default()
    };

    if invalid_ids.is_empty() {
        tracing::info!("All references in composition_details are valid. No corrections required.");
        return Ok(report);
    }
    tracing::info!("{} invalid references found.", invalid_ids.len());

    report.low_code_coverage = code_coverage_is_low(&fragrances);
    if report.low_code_coverage {
        tracing::warn!("Many fragrances have no code. The mapping may be inaccurate.");
    }

    let mappings = plan_repair(&valid, &referenced);
    for mapping in &mappings {
        match mapping.strategy {
            MatchStrategy::Fallback => tracing::warn!(
                "No match for ID {}. Using the first fragrance ({}) as a lossy fallback.",
                mapping.from,
                mapping.to
            ),
            MatchStrategy::Offset => tracing::debug!(
                "ID {} matches ID {} by the historical shift of {}",
                mapping.from,
                mapping.to,
                HISTORICAL_ID_SHIFT
            ),
            MatchStrategy::Exact => {}
        }
    }
    report.invalid_ids = invalid_ids;
    report.mappings = mappings;

    if dry_run {
        for mapping in report.mappings.iter().filter(|m| !m.is_identity()) {
            tracing::info!("[dry run] ID {} would become ID {}.", mapping.from, mapping.to);
        }
        return Ok(report);
    }

    tracing::info!("Updating references in composition_details...");
    report.rows_updated = apply_mappings(store, &report.mappings)?;
    tracing::info!("All references were updated successfully.");

    Ok(report)
}

fn apply_mappings<S: Store>(store: &mut S, mappings: &[IdMapping]) -> Result<usize> {
    store.begin()?;

    let mut rows_updated = 0;
    for mapping in mappings.iter().filter(|m| !m.is_identity()) {
        match store.remap_fragrance_reference(mapping.from, mapping.to) {
            Ok(changed) => {
                rows_updated += changed;
                tracing::info!("ID {} was updated to ID {}.", mapping.from, mapping.to);
            }
            Err(e) => return Err(abort(store, e)),
        }
    }

    if let Err(e) = store.commit() {
        return Err(abort(store, e));
    }
    Ok(rows_updated)
}

fn abort<S: Store>(store: &mut S, cause: MaintError) -> MaintError {
    if let Err(rollback_error) = store.rollback() {
        tracing::error!("Rollback failed: {}", rollback_error);
    }
    tracing::error!("Error while updating the references: {}", cause);
    match cause {
        MaintError::DatabaseError(source) => MaintError::RepairRolledBack { source },
        other => other,
    }
}
