use crate::domain::model::{DanglingCustomer, Fragrance, NewCustomer, NewFragrance};
use crate::domain::ports::Store;
use crate::utils::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const FRAGRANCES: &str = "fragrances";
pub const CUSTOMERS: &str = "customers";
pub const COMPOSITIONS: &str = "compositions";
pub const COMPOSITION_DETAILS: &str = "composition_details";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS customers (
    customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    email TEXT,
    phone TEXT,
    street TEXT,
    postal_code TEXT,
    city TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS fragrances (
    fragrance_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code TEXT,
    description TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS compositions (
    composition_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES customers(customer_id),
    name TEXT DEFAULT '',
    total_amount REAL DEFAULT 0,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS composition_details (
    detail_id INTEGER PRIMARY KEY AUTOINCREMENT,
    composition_id INTEGER NOT NULL REFERENCES compositions(composition_id) ON DELETE CASCADE,
    fragrance_id INTEGER NOT NULL REFERENCES fragrances(fragrance_id),
    amount REAL NOT NULL
);
";

/// SQLite-backed [`Store`].
///
/// Every connection runs with foreign key enforcement on. Enforcement only
/// covers rows written through it, so references that were stored while it
/// was off can still dangle.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory store with the schema applied (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Creates the four tables if they do not exist yet.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl Store for SqliteStore {
    fn missing_tables(&self, tables: &[&str]) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for table in tables {
            if !self.table_exists(table)? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    fn fragrances(&self) -> Result<Vec<Fragrance>> {
        let mut stmt = self.conn.prepare(
            "SELECT fragrance_id, name, code, description FROM fragrances ORDER BY fragrance_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Fragrance {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                code: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn referenced_fragrance_ids(&self) -> Result<BTreeSet<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT fragrance_id FROM composition_details
             WHERE fragrance_id IS NOT NULL ORDER BY fragrance_id",
        )?;
        let ids = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(ids.collect::<rusqlite::Result<BTreeSet<_>>>()?)
    }

    fn customer_ids(&self) -> Result<HashSet<i64>> {
        let mut stmt = self.conn.prepare("SELECT customer_id FROM customers")?;
        let ids = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(ids.collect::<rusqlite::Result<HashSet<_>>>()?)
    }

    fn dangling_customers(&self) -> Result<Vec<DanglingCustomer>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.customer_id, c.first_name, c.last_name, COUNT(cd.detail_id)
             FROM customers c
             JOIN compositions co ON co.customer_id = c.customer_id
             JOIN composition_details cd ON cd.composition_id = co.composition_id
             LEFT JOIN fragrances f ON f.fragrance_id = cd.fragrance_id
             WHERE f.fragrance_id IS NULL
             GROUP BY c.customer_id, c.first_name, c.last_name
             ORDER BY c.last_name, c.first_name, c.customer_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DanglingCustomer {
                customer_id: row.get(0)?,
                first_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                last_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                broken_details: row.get::<_, i64>(3)? as usize,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        for table in [COMPOSITION_DETAILS, COMPOSITIONS, FRAGRANCES, CUSTOMERS] {
            self.conn.execute(&format!("DELETE FROM {}", table), [])?;
        }

        // sqlite_sequence only exists once an AUTOINCREMENT table was created.
        if self.table_exists("sqlite_sequence")? {
            self.conn.execute(
                "DELETE FROM sqlite_sequence WHERE name IN (?1, ?2, ?3, ?4)",
                params![CUSTOMERS, FRAGRANCES, COMPOSITIONS, COMPOSITION_DETAILS],
            )?;
        }
        Ok(())
    }

    fn insert_fragrance(&mut self, fragrance: &NewFragrance) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fragrances (name, code, description) VALUES (?1, ?2, ?3)",
            params![fragrance.name, fragrance.code, fragrance.description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_customer(&mut self, customer: &NewCustomer) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO customers
             (first_name, last_name, email, phone, street, postal_code, city)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                customer.first_name,
                customer.last_name,
                customer.email,
                customer.phone,
                customer.street,
                customer.postal_code,
                customer.city
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_composition(&mut self, customer_id: i64, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO compositions (customer_id, name, total_amount) VALUES (?1, ?2, 0)",
            params![customer_id, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_composition_detail(
        &mut self,
        composition_id: i64,
        fragrance_id: i64,
        amount: f64,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO composition_details (composition_id, fragrance_id, amount)
             VALUES (?1, ?2, ?3)",
            params![composition_id, fragrance_id, amount],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_composition_total(&mut self, composition_id: i64, total: f64) -> Result<()> {
        self.conn.execute(
            "UPDATE compositions SET total_amount = ?1 WHERE composition_id = ?2",
            params![total, composition_id],
        )?;
        Ok(())
    }

    fn remap_fragrance_reference(&mut self, from: i64, to: i64) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE composition_details SET fragrance_id = ?1 WHERE fragrance_id = ?2",
            params![to, from],
        )?;
        Ok(changed)
    }
}
