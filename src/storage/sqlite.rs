//! SQLite content store

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Params, TransactionBehavior, params_from_iter};
use serde_json::{Number, Value};
use tracing::debug;

use crate::core::Attributes;
use crate::error::Result;
use crate::index::schema::{TableSchema, quote_ident};

use super::ContentStore;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory => None,
        }
    }

    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// Whether a non-empty store file is present.
    ///
    /// Opening a connection creates a zero-length file, which does not count.
    pub fn exists(&self) -> bool {
        match self {
            Self::File(path) => fs::metadata(path).is_ok_and(|meta| meta.len() > 0),
            Self::Memory => false,
        }
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.path()
            .and_then(|path| fs::metadata(path).ok())
            .and_then(|meta| meta.modified().ok())
    }
}

/// A table reachable through a shared connection.
#[derive(Debug, Clone)]
pub struct SqlTable {
    pub conn: Arc<Mutex<Connection>>,
    pub table: String,
}

impl SqlTable {
    pub fn new(conn: Arc<Mutex<Connection>>, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    /// Column names as declared, in table order.
    pub fn columns(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(&self.table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Run a query and map every row into an attribute map.
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Attributes>> {
        let conn = self.conn.lock();
        read_rows(&conn, sql, params_from_iter(params.iter()))
    }

    /// Run a query returning a single integer.
    pub fn query_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count)
    }
}

/// SQLite-backed [`ContentStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    location: StoreLocation,
}

impl SqliteStore {
    /// Open (or create) a store at `location`.
    pub fn open(location: StoreLocation) -> Result<Self> {
        let conn = match &location {
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
            StoreLocation::Memory => Connection::open_in_memory()?,
        };

        Self::configure(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(StoreLocation::Memory)
    }

    /// Shared handle to the underlying connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    pub fn table(&self, table: impl Into<String>) -> SqlTable {
        SqlTable::new(self.connection(), table)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // The default rollback journal keeps every commit in the main file,
    // so its mtime tracks the last rebuild.
    fn configure(conn: &Connection) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }
}

impl ContentStore for SqliteStore {
    fn create_schema(&self, schema: &TableSchema) -> Result<()> {
        let conn = self.conn.lock();
        match conn.execute_batch(&schema.create_table_sql()) {
            Ok(()) => Ok(()),
            Err(err) if is_already_exists(&err) => {
                debug!(table = %schema.table, "table already exists; treating creation as done");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn query_by_id(&self, table: &str, key_column: &str, ids: &[String]) -> Result<Vec<Attributes>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({placeholders}) ORDER BY rowid",
            quote_ident(table),
            quote_ident(key_column),
        );
        let conn = self.conn.lock();
        read_rows(&conn, &sql, params_from_iter(ids.iter()))
    }

    fn all(&self, table: &str) -> Result<Vec<Attributes>> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table));
        let conn = self.conn.lock();
        read_rows(&conn, &sql, [])
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))?;
        Ok(())
    }

    fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Single immediate transaction so readers in other processes never see
    /// a half-built table.
    fn replace(&self, schema: &TableSchema, rows: &[Attributes]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(&schema.table)))?;
        tx.execute_batch(&schema.create_table_sql())?;
        let inserted = insert_rows(&tx, schema, rows)?;
        tx.commit()?;
        Ok(inserted)
    }
}

/// `CREATE TABLE` on an existing table. Depending on where SQLite catches
/// it, the failure arrives as a plain failure or as an input error.
fn is_already_exists(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.contains("already exists"),
        rusqlite::Error::SqlInputError { msg, .. } => msg.contains("already exists"),
        _ => false,
    }
}

fn insert_rows(conn: &Connection, schema: &TableSchema, rows: &[Attributes]) -> Result<usize> {
    let table = quote_ident(&schema.table);
    if schema.columns.is_empty() {
        let mut stmt = conn.prepare(&format!("INSERT INTO {table} DEFAULT VALUES"))?;
        for _ in rows {
            stmt.execute([])?;
        }
        return Ok(rows.len());
    }

    let columns: Vec<String> = schema.column_names().map(quote_ident).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;

    for row in rows {
        let values: Vec<SqlValue> = schema
            .column_names()
            .map(|name| lookup(row, name).map_or(SqlValue::Null, json_to_sql))
            .collect();
        stmt.execute(params_from_iter(values.iter()))?;
    }
    drop(stmt);

    let stored: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(usize::try_from(stored).unwrap_or_default())
}

fn lookup<'a>(row: &'a Attributes, name: &str) -> Option<&'a Value> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn read_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Attributes>> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params)?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut attributes = Attributes::new();
        for (idx, name) in names.iter().enumerate() {
            attributes.insert(name.clone(), sql_to_json(row.get_ref(idx)?));
        }
        out.push(attributes);
    }
    Ok(out)
}

/// Convert an attribute value into an SQLite value.
pub fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .unwrap_or(SqlValue::Null),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Convert an SQLite value into an attribute value.
pub fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
