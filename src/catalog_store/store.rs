//! SQLite-backed catalog store implementation.
//!
//! This module provides the `SqliteCatalogStore`, which persists catalog
//! records in a local SQLite database and exposes the document-store style
//! filter/update operations of the `CatalogStore` trait.

use super::models::{Catalog, CatalogFieldSet, CatalogFilter, NewCatalog, Vertical};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite-backed catalog store.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn init_schema_if_needed(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    if table_count == 0 {
        // Brand new database - create the latest schema directly
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let expected = (BASE_DB_VERSION + latest_version) as i64;
    if db_version != expected {
        bail!(
            "Catalog db has schema version {}, expected {}",
            db_version,
            expected
        );
    }
    Ok(())
}

impl SqliteCatalogStore {
    /// Open (creating if necessary) the catalog database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_read_pool_size(db_path, DEFAULT_READ_POOL_SIZE)
    }

    pub fn with_read_pool_size<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        init_schema_if_needed(&write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let catalog_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM catalogs", [], |r| r.get(0))
            .unwrap_or(0);
        info!("Opened catalog database: {} catalogs", catalog_count);

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    // =========================================================================
    // Internal Helper Methods
    // =========================================================================

    /// Get a catalog rowid from its public id.
    fn get_catalog_rowid(conn: &Connection, id: &str) -> Result<Option<i64>> {
        match conn.query_row(
            "SELECT rowid FROM catalogs WHERE id = ?1",
            params![id],
            |r| r.get(0),
        ) {
            Ok(rowid) => Ok(Some(rowid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get ordered locales for a catalog by rowid.
    fn get_catalog_locales(conn: &Connection, catalog_rowid: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare_cached(
            "SELECT locale FROM catalog_locales WHERE catalog_rowid = ?1 ORDER BY position",
        )?;
        let locales = stmt
            .query_map(params![catalog_rowid], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(locales)
    }

    /// Render a filter as a WHERE clause with positional params.
    fn filter_clause(filter: &CatalogFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(id) = &filter.id {
            values.push(Box::new(id.clone()));
            conditions.push(format!("id = ?{}", values.len()));
        }
        if let Some(vertical) = filter.vertical {
            values.push(Box::new(vertical.to_db_str()));
            conditions.push(format!("vertical = ?{}", values.len()));
        }
        if let Some(primary) = filter.primary {
            values.push(Box::new(primary as i32));
            conditions.push(format!("is_primary = ?{}", values.len()));
        }
        if let Some(exclude_id) = &filter.exclude_id {
            values.push(Box::new(exclude_id.clone()));
            conditions.push(format!("id != ?{}", values.len()));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        (clause, values)
    }

    /// Replace the locale rows of a catalog.
    fn replace_locales(conn: &Connection, catalog_rowid: i64, locales: &[String]) -> Result<()> {
        conn.execute(
            "DELETE FROM catalog_locales WHERE catalog_rowid = ?1",
            params![catalog_rowid],
        )?;
        for (position, locale) in locales.iter().enumerate() {
            conn.execute(
                "INSERT INTO catalog_locales (catalog_rowid, locale, position) VALUES (?1, ?2, ?3)",
                params![catalog_rowid, locale, position as i64],
            )?;
        }
        Ok(())
    }

    /// Apply a field set to the record at `rowid`. Caller holds the write
    /// transaction.
    fn apply_field_set(conn: &Connection, rowid: i64, set: &CatalogFieldSet) -> Result<()> {
        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(name) = &set.name {
            values.push(Box::new(name.clone()));
            assignments.push(format!("name = ?{}", values.len()));
        }
        if let Some(vertical) = set.vertical {
            values.push(Box::new(vertical.to_db_str()));
            assignments.push(format!("vertical = ?{}", values.len()));
        }
        if let Some(primary) = set.primary {
            values.push(Box::new(primary as i32));
            assignments.push(format!("is_primary = ?{}", values.len()));
        }
        if let Some(is_multilocale) = set.is_multilocale {
            values.push(Box::new(is_multilocale as i32));
            assignments.push(format!("is_multilocale = ?{}", values.len()));
        }

        if !assignments.is_empty() {
            values.push(Box::new(rowid));
            let sql = format!(
                "UPDATE catalogs SET {} WHERE rowid = ?{}",
                assignments.join(", "),
                values.len()
            );
            conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
        }

        if let Some(locales) = &set.locales {
            Self::replace_locales(conn, rowid, locales)?;
        }
        Ok(())
    }

    /// Run `body` inside a BEGIN IMMEDIATE transaction on the write
    /// connection, rolling back on error.
    fn in_write_transaction<T>(&self, body: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        match body(&conn) {
            Ok(value) => {
                conn.execute("COMMIT", [])?;
                Ok(value)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn find_one_rowid(conn: &Connection, filter: &CatalogFilter) -> Result<Option<i64>> {
        let (clause, values) = Self::filter_clause(filter);
        let sql = format!("SELECT rowid FROM catalogs{} LIMIT 1", clause);
        match conn.query_row(
            &sql,
            params_from_iter(values.iter().map(|v| v.as_ref())),
            |r| r.get(0),
        ) {
            Ok(rowid) => Ok(Some(rowid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

const CATALOG_COLUMNS: &str = "id, name, vertical, is_primary, is_multilocale";

impl CatalogStore for SqliteCatalogStore {
    fn find_all(&self) -> Result<Vec<Catalog>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let mut stmt = conn.prepare_cached(&format!(
            "SELECT rowid, {} FROM catalogs ORDER BY rowid",
            CATALOG_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], |r| {
                let rowid: i64 = r.get(0)?;
                Ok((
                    rowid,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i32>(4)?,
                    r.get::<_, i32>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalogs = Vec::with_capacity(rows.len());
        for (rowid, id, name, vertical_str, is_primary, is_multilocale) in rows {
            let vertical = match Vertical::from_db_str(&vertical_str) {
                Some(v) => v,
                None => bail!("Unknown vertical '{}' in catalog row", vertical_str),
            };
            let locales = Self::get_catalog_locales(&conn, rowid)?;
            catalogs.push(Catalog {
                id,
                name,
                vertical,
                primary: is_primary != 0,
                locales,
                is_multilocale: is_multilocale != 0,
            });
        }
        Ok(catalogs)
    }

    fn find_one(&self, filter: &CatalogFilter) -> Result<Option<Catalog>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();

        let (clause, values) = Self::filter_clause(filter);
        let sql = format!(
            "SELECT rowid, {} FROM catalogs{} LIMIT 1",
            CATALOG_COLUMNS, clause
        );
        let row = match conn.query_row(
            &sql,
            params_from_iter(values.iter().map(|v| v.as_ref())),
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i32>(4)?,
                    r.get::<_, i32>(5)?,
                ))
            },
        ) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (rowid, id, name, vertical_str, is_primary, is_multilocale) = row;
        let vertical = match Vertical::from_db_str(&vertical_str) {
            Some(v) => v,
            None => bail!("Unknown vertical '{}' in catalog row", vertical_str),
        };
        let locales = Self::get_catalog_locales(&conn, rowid)?;
        Ok(Some(Catalog {
            id,
            name,
            vertical,
            primary: is_primary != 0,
            locales,
            is_multilocale: is_multilocale != 0,
        }))
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Catalog>> {
        self.find_one(&CatalogFilter::by_id(id))
    }

    fn insert(&self, record: NewCatalog) -> Result<Catalog> {
        let id = uuid::Uuid::new_v4().to_string();

        self.in_write_transaction(|conn| {
            conn.execute(
                "INSERT INTO catalogs (id, name, vertical, is_primary, is_multilocale) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &id,
                    &record.name,
                    record.vertical.to_db_str(),
                    record.primary as i32,
                    record.is_multilocale as i32
                ],
            )?;

            let catalog_rowid: i64 = conn.query_row(
                "SELECT rowid FROM catalogs WHERE id = ?1",
                params![&id],
                |r| r.get(0),
            )?;

            Self::replace_locales(conn, catalog_rowid, &record.locales)?;

            Ok(Catalog {
                id: id.clone(),
                name: record.name.clone(),
                vertical: record.vertical,
                primary: record.primary,
                locales: record.locales.clone(),
                is_multilocale: record.is_multilocale,
            })
        })
    }

    fn update_one(&self, filter: &CatalogFilter, set: &CatalogFieldSet) -> Result<bool> {
        self.in_write_transaction(|conn| {
            let rowid = match Self::find_one_rowid(conn, filter)? {
                Some(rowid) => rowid,
                None => return Ok(false),
            };
            Self::apply_field_set(conn, rowid, set)?;
            Ok(true)
        })
    }

    fn update_by_id(&self, id: &str, set: &CatalogFieldSet) -> Result<bool> {
        self.in_write_transaction(|conn| {
            let rowid = match Self::get_catalog_rowid(conn, id)? {
                Some(rowid) => rowid,
                None => return Ok(false),
            };
            Self::apply_field_set(conn, rowid, set)?;
            Ok(true)
        })
    }

    fn delete_by_id(&self, id: &str) -> Result<usize> {
        self.in_write_transaction(|conn| {
            conn.execute(
                "DELETE FROM catalog_locales WHERE catalog_rowid IN \
                 (SELECT rowid FROM catalogs WHERE id = ?1)",
                params![id],
            )?;
            let deleted = conn.execute("DELETE FROM catalogs WHERE id = ?1", params![id])?;
            Ok(deleted)
        })
    }

    fn delete_by_ids(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        self.in_write_transaction(|conn| {
            conn.execute(
                &format!(
                    "DELETE FROM catalog_locales WHERE catalog_rowid IN \
                     (SELECT rowid FROM catalogs WHERE id IN ({}))",
                    placeholders
                ),
                params_from_iter(ids.iter()),
            )?;
            let deleted = conn.execute(
                &format!("DELETE FROM catalogs WHERE id IN ({})", placeholders),
                params_from_iter(ids.iter()),
            )?;
            Ok(deleted)
        })
    }
}
