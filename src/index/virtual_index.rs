//! Materialized index for filesystem-backed content.
//!
//! One [`VirtualIndex`] exists per (content type, theme). It copies the
//! enumerated content into a SQLite table so engines can query it, and
//! rebuilds that table whenever the source looks newer than the store.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized -> SchemaResolving -> StoreReady <-> Indexing
//!        ^                                |
//!        +----------- teardown -----------+
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::content::{ContentEnumerator, ContentItem};
use crate::core::{Attributes, attribute_path, normalize_path, slug, slugify_identifier};
use crate::error::Result;
use crate::storage::{ContentStore, SqlTable, SqliteStore, StoreLocation, StoreLock};

use super::schema::{ColumnType, SchemaSource, TableSchema, resolve_schema};

/// Table holding the materialized rows.
pub const INDEX_TABLE: &str = "content_index";
/// Slugged file name; the row key.
pub const KEY_COLUMN: &str = "fileName";
/// Raw file name relative to the object directory.
pub const PATH_COLUMN: &str = "path";

/// Registry key: one index per content type and theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexKey {
    pub model: String,
    pub theme: String,
}

impl IndexKey {
    pub fn new(model: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            theme: theme.into(),
        }
    }

    /// `slug(theme-model)` with path separators folded to hyphens.
    pub fn identifier(&self) -> String {
        let model = self.model.replace(['/', '\\', '.'], "-");
        slug(&format!("{}-{model}", self.theme))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    SchemaResolving,
    StoreReady,
    Indexing,
}

/// Settings shared by every index of a registry.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Directory for store files. `None` keeps every store in memory.
    pub index_dir: Option<PathBuf>,
    /// Namespace prefix for index names and store files.
    pub prefix: String,
    pub lock_timeout: Duration,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            index_dir: None,
            prefix: String::new(),
            lock_timeout: Duration::from_secs(30),
        }
    }
}

/// What gets materialized and how.
#[derive(Clone)]
pub struct IndexSource {
    pub enumerator: Arc<dyn ContentEnumerator>,
    /// Attributes copied into each row besides the key and path.
    pub fields: Vec<String>,
    pub schema: Vec<(String, ColumnType)>,
    pub include_variants: bool,
}

impl std::fmt::Debug for IndexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSource")
            .field("type", &self.enumerator.type_name())
            .field("fields", &self.fields)
            .field("schema", &self.schema)
            .field("include_variants", &self.include_variants)
            .finish()
    }
}

/// Point-in-time view of an index, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub identifier: String,
    pub key: IndexKey,
    pub phase: Phase,
    pub store: Option<PathBuf>,
    pub stale: bool,
    pub indexed_at: Option<DateTime<Utc>>,
    pub rows: Option<usize>,
}

struct IndexState {
    phase: Phase,
    schema: Option<TableSchema>,
    store: Option<Arc<SqliteStore>>,
    indexed_at: Option<DateTime<Utc>>,
    rows: Option<usize>,
}

pub struct VirtualIndex {
    key: IndexKey,
    identifier: String,
    searchable_as: String,
    source: IndexSource,
    location: StoreLocation,
    lock_timeout: Duration,
    stale: AtomicBool,
    state: Mutex<IndexState>,
}

impl std::fmt::Debug for VirtualIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualIndex")
            .field("identifier", &self.identifier)
            .field("location", &self.location)
            .field("stale", &self.stale.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl VirtualIndex {
    pub fn new(key: IndexKey, source: IndexSource, settings: &IndexSettings) -> Self {
        let identifier = key.identifier();
        let searchable_as = format!("{}{identifier}", settings.prefix);
        let location = store_location(settings.index_dir.as_deref(), &format!("{searchable_as}.sqlite"));

        Self {
            key,
            identifier,
            searchable_as,
            source,
            location,
            lock_timeout: settings.lock_timeout,
            stale: AtomicBool::new(false),
            state: Mutex::new(IndexState {
                phase: Phase::Uninitialized,
                schema: None,
                store: None,
                indexed_at: None,
                rows: None,
            }),
        }
    }

    pub fn key(&self) -> &IndexKey {
        &self.key
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Prefixed index name; also the store file stem.
    pub fn searchable_as(&self) -> &str {
        &self.searchable_as
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Force a rebuild on next access.
    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Whether the store must be rebuilt before it can be trusted.
    ///
    /// True after [`invalidate`](Self::invalidate), for in-memory stores,
    /// when the store file is missing or empty, or when it is older than the
    /// content type's definition file or its newest content.
    pub fn needs_update(&self) -> bool {
        if self.stale.load(Ordering::Acquire) {
            return true;
        }
        if !self.location.exists() {
            return true;
        }
        let Some(stored) = self.location.last_modified() else {
            return true;
        };

        let definition_newer = self
            .source
            .enumerator
            .definition_path()
            .and_then(|path| modified(&path))
            .is_some_and(|time| time > stored);
        let content_newer = self
            .source
            .enumerator
            .last_modified(&self.key.theme)
            .is_some_and(|time| time > stored);

        definition_newer || content_newer
    }

    /// Bring the store up to date and return it.
    ///
    /// On failure the index falls back to the phase it was in before the
    /// call.
    pub fn ensure_fresh(&self) -> Result<Arc<SqliteStore>> {
        let mut state = self.state.lock();
        let previous = state.phase;
        let result = self.advance(&mut state);
        if result.is_err() {
            state.phase = previous;
            if previous == Phase::Uninitialized {
                state.store = None;
                state.schema = None;
            }
        }
        result
    }

    fn advance(&self, state: &mut IndexState) -> Result<Arc<SqliteStore>> {
        let mut prefetched = None;

        if state.phase == Phase::Uninitialized {
            // Staleness is judged before opening, which creates the file.
            let stale = self.needs_update();

            state.phase = Phase::SchemaResolving;
            let rows = self.collect_rows()?;
            let schema = self.resolve(rows.first())?;

            let store = Arc::new(SqliteStore::open(self.location.clone())?);
            store.create_schema(&schema)?;
            state.schema = Some(schema);
            state.store = Some(store);
            state.phase = Phase::StoreReady;
            debug!(index = %self.identifier, location = ?self.location, "index store ready");

            if stale {
                self.invalidate();
            }
            prefetched = Some(rows);
        }

        if self.needs_update() {
            state.phase = Phase::Indexing;
            self.rebuild(state, prefetched)?;
            state.phase = Phase::StoreReady;
        }

        state.store.clone().ok_or_else(|| {
            crate::error::SearchError::NotFound(format!("store for index {}", self.identifier))
        })
    }

    fn rebuild(&self, state: &mut IndexState, prefetched: Option<Vec<Attributes>>) -> Result<()> {
        let _lock = match self.location.path() {
            Some(path) => Some(StoreLock::acquire_timeout(path, self.lock_timeout)?),
            None => None,
        };

        // Another process may have rebuilt while we waited for the lock.
        if !self.needs_update() {
            debug!(index = %self.identifier, "index rebuilt elsewhere; skipping");
            return Ok(());
        }

        self.stale.store(false, Ordering::Release);
        let outcome = self.write_rows(state, prefetched);
        if outcome.is_err() {
            self.stale.store(true, Ordering::Release);
        }
        outcome
    }

    fn write_rows(&self, state: &mut IndexState, prefetched: Option<Vec<Attributes>>) -> Result<()> {
        let rows = match prefetched {
            Some(rows) => rows,
            None => self.collect_rows()?,
        };
        let schema = self.resolve(rows.first())?;

        let store = match &state.store {
            Some(store) => Arc::clone(store),
            None => Arc::new(SqliteStore::open(self.location.clone())?),
        };
        let inserted = store.replace(&schema, &rows)?;

        state.schema = Some(schema);
        state.store = Some(store);
        state.indexed_at = Some(Utc::now());
        state.rows = Some(inserted);
        info!(index = %self.identifier, rows = inserted, "rebuilt materialized index");
        Ok(())
    }

    fn collect_rows(&self) -> Result<Vec<Attributes>> {
        let items = self
            .source
            .enumerator
            .list_all(&self.key.theme, self.source.include_variants)?;
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            let row = self.row_for(item);
            let key = row[KEY_COLUMN].as_str().unwrap_or_default().to_string();
            if !seen.insert(key.clone()) {
                warn!(
                    index = %self.identifier,
                    file = %item.file_name,
                    key = %key,
                    "skipping content whose key collides with an earlier file"
                );
                continue;
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// `fileName` (slug), `path` (raw) and each indexed field.
    fn row_for(&self, item: &ContentItem) -> Attributes {
        let mut row = Attributes::new();
        row.insert(KEY_COLUMN.to_string(), Value::from(slugify_identifier(&item.file_name)));
        row.insert(PATH_COLUMN.to_string(), Value::from(item.file_name.clone()));
        for field in &self.source.fields {
            let column = normalize_path(field);
            if column.eq_ignore_ascii_case(KEY_COLUMN) || column.eq_ignore_ascii_case(PATH_COLUMN) {
                continue;
            }
            let value = attribute_path(&item.attributes, field)
                .cloned()
                .unwrap_or(Value::Null);
            row.insert(column, value);
        }
        row
    }

    fn resolve(&self, sample: Option<&Attributes>) -> Result<TableSchema> {
        resolve_schema(SchemaSource {
            index: &self.identifier,
            table: INDEX_TABLE,
            explicit: &self.source.schema,
            sample,
            key_name: KEY_COLUMN,
            incrementing: false,
        })
    }

    /// Every materialized row, in store order.
    pub fn records(&self) -> Result<Vec<Attributes>> {
        self.ensure_fresh()?.all(INDEX_TABLE)
    }

    /// Rows for the given identifiers in store order, not input order.
    ///
    /// Identifiers may be raw file names or slugs; both sides are slugged.
    pub fn find_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Attributes>> {
        let slugs: Vec<String> = ids
            .iter()
            .map(|id| slugify_identifier(id.as_ref()))
            .collect();
        self.ensure_fresh()?.query_by_id(INDEX_TABLE, KEY_COLUMN, &slugs)
    }

    /// Like [`find_by_ids`](Self::find_by_ids), but in input order. Repeated
    /// identifiers yield one row.
    pub fn find_by_ids_ordered<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Attributes>> {
        let mut rows = self.find_by_ids(ids)?;
        let mut ordered = Vec::with_capacity(rows.len());
        for id in ids {
            let wanted = slugify_identifier(id.as_ref());
            if let Some(pos) = rows
                .iter()
                .position(|row| row.get(KEY_COLUMN).and_then(Value::as_str) == Some(wanted.as_str()))
            {
                ordered.push(rows.remove(pos));
            }
        }
        Ok(ordered)
    }

    /// The materialized table, refreshed, for engines that query SQL.
    pub fn sql_table(&self) -> Result<SqlTable> {
        Ok(self.ensure_fresh()?.table(INDEX_TABLE))
    }

    /// Discard the store and its schema together.
    pub fn teardown(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(store) = state.store.take() {
            store.drop_table(INDEX_TABLE)?;
        }
        state.schema = None;
        state.indexed_at = None;
        state.rows = None;
        state.phase = Phase::Uninitialized;

        if let Some(path) = self.location.path() {
            remove_if_present(path)?;
            remove_if_present(&StoreLock::path_for(path))?;
        }
        self.stale.store(false, Ordering::Release);
        info!(index = %self.identifier, "tore down materialized index");
        Ok(())
    }

    pub fn status(&self) -> IndexStatus {
        let state = self.state.lock();
        IndexStatus {
            identifier: self.identifier.clone(),
            key: self.key.clone(),
            phase: state.phase,
            store: self.location.path().map(Path::to_path_buf),
            stale: self.needs_update(),
            indexed_at: state.indexed_at,
            rows: state.rows,
        }
    }
}

fn store_location(dir: Option<&Path>, file_name: &str) -> StoreLocation {
    let Some(dir) = dir else {
        return StoreLocation::Memory;
    };
    let writable = fs::create_dir_all(dir).is_ok()
        && fs::metadata(dir).is_ok_and(|meta| meta.is_dir() && !meta.permissions().readonly());
    if writable {
        StoreLocation::File(dir.join(file_name))
    } else {
        debug!(dir = %dir.display(), "index directory not writable; using in-memory store");
        StoreLocation::Memory
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
