use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub component: ComponentConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (or `CMS_SEARCH_CONFIG`) replaces the file lookup;
    /// otherwise the global file is merged first, then `search.toml` in
    /// `project_root`. Environment overrides are applied last.
    ///
    /// Unless `index.definition` is set, the last file read becomes the
    /// definition file whose mtime marks materialized stores stale.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();
        let mut loaded = None;

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("CMS_SEARCH_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
                loaded = Some(path);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            let project = project_root.join("search.toml");
            if let Some(patch) = Self::load_patch(&project)? {
                config.merge_patch(patch);
                loaded = Some(project);
            }
        }

        config.apply_env_overrides()?;
        if config.index.definition.is_none() {
            config.index.definition = loaded;
        }

        Ok(config)
    }

    /// Parse a TOML document on top of the defaults, without files or env.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| SearchError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("cms-search/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SearchError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SearchError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.index {
            self.index.merge(patch);
        }
        if let Some(patch) = patch.theme {
            self.theme.merge(patch);
        }
        if let Some(patch) = patch.component {
            self.component.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SEARCH_ENGINE") {
            self.search.driver = value;
        }
        if let Some(value) = env_string("SEARCH_PREFIX") {
            self.search.prefix = value;
        }
        if let Some(value) = env_bool("SEARCH_SOFT_DELETE") {
            self.search.soft_delete = value;
        }
        if let Some(value) = env_bool("SEARCH_QUEUE") {
            self.search.queue = QueueConfig::Enabled(value);
        }
        if let Some(value) = env_bool("SEARCH_AFTER_COMMIT") {
            self.search.after_commit = value;
        }

        if let Some(value) = env_string("SEARCH_INDEX_PATH") {
            self.index.path = non_empty_path(value);
        }
        if let Some(value) = env_string("SEARCH_INDEX_DEFINITION") {
            self.index.definition = non_empty_path(value);
        }
        if let Some(value) = env_u64("SEARCH_LOCK_TIMEOUT_SECS")? {
            self.index.lock_timeout_secs = value;
        }

        if let Some(value) = env_string("SEARCH_THEMES_ROOT") {
            self.theme.root = PathBuf::from(value);
        }
        if let Some(value) = env_string("SEARCH_THEME") {
            self.theme.active = value;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// `database`, `collection` or `null`. Empty means `null`.
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub prefix: String,
    /// Let `with_trashed` searches include soft-deleted records.
    #[serde(default)]
    pub soft_delete: bool,
    #[serde(default)]
    pub after_commit: bool,
    #[serde(default)]
    pub queue: QueueConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            prefix: String::new(),
            soft_delete: false,
            after_commit: false,
            queue: QueueConfig::default(),
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.driver {
            self.driver = value;
        }
        if let Some(value) = patch.prefix {
            self.prefix = value;
        }
        if let Some(value) = patch.soft_delete {
            self.soft_delete = value;
        }
        if let Some(value) = patch.after_commit {
            self.after_commit = value;
        }
        if let Some(value) = patch.queue {
            self.queue = value;
        }
    }
}

fn default_driver() -> String {
    "database".to_string()
}

/// `queue = true` or `queue = { connection = "redis", queue = "search" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueConfig {
    Enabled(bool),
    Target {
        #[serde(default)]
        connection: Option<String>,
        #[serde(default)]
        queue: Option<String>,
    },
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl QueueConfig {
    pub const fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Target { .. } => true,
        }
    }

    pub fn connection(&self) -> Option<&str> {
        match self {
            Self::Target { connection, .. } => connection.as_deref(),
            Self::Enabled(_) => None,
        }
    }

    pub fn queue(&self) -> Option<&str> {
        match self {
            Self::Target { queue, .. } => queue.as_deref(),
            Self::Enabled(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory for materialized stores. `None` keeps them in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// File whose modification marks every store stale.
    #[serde(default)]
    pub definition: Option<PathBuf>,
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: None,
            definition: None,
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

impl IndexConfig {
    fn merge(&mut self, patch: IndexPatch) {
        if let Some(value) = patch.path {
            self.path = non_empty_path(value);
        }
        if let Some(value) = patch.definition {
            self.definition = non_empty_path(value);
        }
        if let Some(value) = patch.lock_timeout_secs {
            self.lock_timeout_secs = value;
        }
    }

    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

const fn default_lock_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_themes_root")]
    pub root: PathBuf,
    #[serde(default = "default_theme")]
    pub active: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            root: default_themes_root(),
            active: default_theme(),
        }
    }
}

impl ThemeConfig {
    fn merge(&mut self, patch: ThemePatch) {
        if let Some(value) = patch.root {
            self.root = PathBuf::from(value);
        }
        if let Some(value) = patch.active {
            self.active = value;
        }
    }
}

fn default_themes_root() -> PathBuf {
    PathBuf::from("themes")
}

fn default_theme() -> String {
    "default".to_string()
}

/// Defaults for multi-handler search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub fuzzy_search: bool,
    #[serde(default)]
    pub order_by_relevance: bool,
    #[serde(default = "default_true")]
    pub show_excerpts: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default)]
    pub grouping: bool,
    #[serde(default = "default_per_group")]
    pub per_group: usize,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            fuzzy_search: false,
            order_by_relevance: false,
            show_excerpts: true,
            limit: default_limit(),
            per_page: default_per_page(),
            grouping: false,
            per_group: default_per_group(),
        }
    }
}

impl ComponentConfig {
    fn merge(&mut self, patch: ComponentPatch) {
        if let Some(value) = patch.fuzzy_search {
            self.fuzzy_search = value;
        }
        if let Some(value) = patch.order_by_relevance {
            self.order_by_relevance = value;
        }
        if let Some(value) = patch.show_excerpts {
            self.show_excerpts = value;
        }
        if let Some(value) = patch.limit {
            self.limit = value;
        }
        if let Some(value) = patch.per_page {
            self.per_page = value;
        }
        if let Some(value) = patch.grouping {
            self.grouping = value;
        }
        if let Some(value) = patch.per_group {
            self.per_group = value;
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_limit() -> usize {
    100
}

const fn default_per_page() -> usize {
    20
}

const fn default_per_group() -> usize {
    5
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub search: Option<SearchPatch>,
    pub index: Option<IndexPatch>,
    pub theme: Option<ThemePatch>,
    pub component: Option<ComponentPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub driver: Option<String>,
    pub prefix: Option<String>,
    pub soft_delete: Option<bool>,
    pub after_commit: Option<bool>,
    pub queue: Option<QueueConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IndexPatch {
    pub path: Option<String>,
    pub definition: Option<String>,
    pub lock_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ThemePatch {
    pub root: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ComponentPatch {
    pub fuzzy_search: Option<bool>,
    pub order_by_relevance: Option<bool>,
    pub show_excerpts: Option<bool>,
    pub limit: Option<usize>,
    pub per_page: Option<usize>,
    pub grouping: Option<bool>,
    pub per_group: Option<usize>,
}

fn non_empty_path(value: String) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            SearchError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
