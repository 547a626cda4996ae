use anyhow::Result;
use perfumery_maint::{AuditJob, JobRunner, MaintError, RepairJob, SqliteStore};
use rusqlite::params;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a store whose details may reference missing fragrances. Foreign keys
/// are switched off on this connection only, the way such stores came about.
fn create_store(dir: &TempDir, fragrance_ids: &[i64], detail_refs: &[i64]) -> Result<PathBuf> {
    let path = dir.path().join("parfumerie.db");
    let store = SqliteStore::open(&path)?;
    store.ensure_schema()?;
    let conn = store.connection();
    conn.execute_batch("PRAGMA foreign_keys=OFF;")?;

    for id in fragrance_ids {
        conn.execute(
            "INSERT INTO fragrances (fragrance_id, name, code, description) VALUES (?1, ?2, ?3, '')",
            params![id, format!("Duft {}", id), format!("{}", 100 + id)],
        )?;
    }
    conn.execute(
        "INSERT INTO customers (first_name, last_name) VALUES ('Maria', 'Schmidt')",
        [],
    )?;
    conn.execute(
        "INSERT INTO compositions (customer_id, name, total_amount) VALUES (1, '', 0)",
        [],
    )?;
    for fragrance_id in detail_refs {
        conn.execute(
            "INSERT INTO composition_details (composition_id, fragrance_id, amount) VALUES (1, ?1, 1.5)",
            params![fragrance_id],
        )?;
    }

    Ok(path)
}

fn detail_refs(path: &Path) -> Result<Vec<i64>> {
    let store = SqliteStore::open(path)?;
    let mut stmt = store
        .connection()
        .prepare("SELECT fragrance_id FROM composition_details ORDER BY detail_id")?;
    let refs = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(refs)
}

#[test]
fn test_repair_example_scenario() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 3], &[61, 2, 99, 61])?;

    let outcome = JobRunner::new(RepairJob::new(path.clone())).run()?;

    assert_eq!(outcome.report.invalid_ids, vec![61, 99]);
    // 61 + 60 is not a fragrance either, so both ids fall back to 1.
    assert_eq!(outcome.report.fallback_count(), 2);
    assert_eq!(outcome.report.rows_updated, 3);
    assert_eq!(detail_refs(&path)?, vec![1, 2, 1, 1]);

    let valid: BTreeSet<i64> = [1, 2, 3].into_iter().collect();
    assert!(detail_refs(&path)?.iter().all(|id| valid.contains(id)));

    let backup = outcome.backup.expect("mutating job writes a backup");
    assert_eq!(backup, dir.path().join("parfumerie.db.backup"));
    assert_eq!(detail_refs(&backup)?, vec![61, 2, 99, 61]);
    Ok(())
}

#[test]
fn test_repair_succeeds_with_foreign_keys_enforced() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 3], &[61, 99])?;

    let store = SqliteStore::open(&path)?;
    let enforced: i64 = store
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    assert_eq!(enforced, 1);
    let rejected = store.connection().execute(
        "INSERT INTO composition_details (composition_id, fragrance_id, amount) VALUES (1, 61, 1.0)",
        [],
    );
    assert!(rejected.is_err());
    drop(store);

    let outcome = JobRunner::new(RepairJob::new(path.clone())).run()?;

    assert_eq!(outcome.report.rows_updated, 2);
    assert_eq!(detail_refs(&path)?, vec![1, 1]);
    Ok(())
}

#[test]
fn test_second_repair_run_is_noop() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 3], &[61, 99])?;

    JobRunner::new(RepairJob::new(path.clone())).run()?;
    let before = fs::read(&path)?;

    let second = JobRunner::new(RepairJob::new(path.clone())).run()?;

    assert!(second.report.is_noop());
    assert_eq!(second.report.rows_updated, 0);
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_offset_match_remaps_all_rows() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 65, 66], &[5, 5, 6, 65])?;

    let outcome = JobRunner::new(RepairJob::new(path.clone())).run()?;

    assert_eq!(outcome.report.fallback_count(), 0);
    assert_eq!(detail_refs(&path)?, vec![65, 65, 66, 65]);
    Ok(())
}

#[test]
fn test_fallback_is_deterministic_across_runs() -> Result<()> {
    for _ in 0..2 {
        let dir = TempDir::new()?;
        let path = create_store(&dir, &[4, 9, 12], &[500, 501])?;

        JobRunner::new(RepairJob::new(path.clone())).run()?;

        assert_eq!(detail_refs(&path)?, vec![4, 4]);
    }
    Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 3], &[61, 99])?;

    let outcome = JobRunner::new(RepairJob::new(path.clone()).dry_run(true)).run()?;

    assert!(outcome.backup.is_none());
    assert_eq!(outcome.report.mappings.len(), 2);
    assert_eq!(outcome.report.rows_updated, 0);
    assert_eq!(detail_refs(&path)?, vec![61, 99]);
    assert!(!dir.path().join("parfumerie.db.backup").exists());
    Ok(())
}

#[test]
fn test_failed_update_rolls_back_every_mapping() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 121, 122], &[61, 62])?;
    SqliteStore::open(&path)?.connection().execute_batch(
        "CREATE TRIGGER block_second_remap
         BEFORE UPDATE OF fragrance_id ON composition_details
         WHEN NEW.fragrance_id = 122
         BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
    )?;

    let err = JobRunner::new(RepairJob::new(path.clone()))
        .run()
        .unwrap_err();

    assert!(matches!(err, MaintError::RepairRolledBack { .. }));
    assert_ne!(err.exit_code(), 0);
    assert_eq!(detail_refs(&path)?, vec![61, 62]);
    Ok(())
}

#[test]
fn test_missing_tables_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("other.db");
    SqliteStore::open(&path)?
        .connection()
        .execute_batch("CREATE TABLE fragrances (fragrance_id INTEGER PRIMARY KEY, name TEXT);")?;

    let err = JobRunner::new(RepairJob::new(path)).run().unwrap_err();

    match err {
        MaintError::MissingTables { tables } => {
            assert_eq!(tables, vec!["composition_details".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_missing_store_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = JobRunner::new(RepairJob::new(dir.path().join("parfumerie.db")))
        .run()
        .unwrap_err();

    assert!(matches!(err, MaintError::StoreNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_empty_fragrance_table_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[], &[3])?;

    let err = JobRunner::new(RepairJob::new(path)).run().unwrap_err();

    assert!(matches!(err, MaintError::NoFragrances));
    Ok(())
}

#[test]
fn test_audit_lists_customers_before_repair_only() -> Result<()> {
    let dir = TempDir::new()?;
    let path = create_store(&dir, &[1, 2, 3], &[61, 2])?;

    let before = JobRunner::new(AuditJob::new(path.clone())).run()?;
    assert!(before.backup.is_none());
    assert_eq!(before.report.customers.len(), 1);
    assert_eq!(before.report.customers[0].last_name, "Schmidt");
    assert_eq!(before.report.customers[0].broken_details, 1);

    JobRunner::new(RepairJob::new(path.clone())).run()?;

    let after = JobRunner::new(AuditJob::new(path)).run()?;
    assert!(after.report.customers.is_empty());
    Ok(())
}
