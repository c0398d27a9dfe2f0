//! Driver resolution and engine caching.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};

use super::{CollectionEngine, DatabaseEngine, Engine, NullEngine};

/// Hosted drivers the search config may name but this crate does not ship.
const HOSTED_DRIVERS: &[&str] = &["algolia", "meilisearch", "typesense"];

/// Resolves driver names to engines, creating each at most once.
pub struct EngineManager {
    config: SearchConfig,
    engines: Mutex<HashMap<String, Arc<dyn Engine>>>,
}

impl std::fmt::Debug for EngineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineManager")
            .field("default_driver", &self.default_driver())
            .field("cached", &self.engines.lock().keys().cloned().collect::<Vec<_>>())
            .finish()
    }
}

impl EngineManager {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            engines: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Configured driver name. Blank means `null`.
    pub fn default_driver(&self) -> &str {
        let driver = self.config.driver.trim();
        if driver.is_empty() { "null" } else { driver }
    }

    /// Engine for `driver`, or the default driver when `None`.
    pub fn engine(&self, driver: Option<&str>) -> Result<Arc<dyn Engine>> {
        let name = driver
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.default_driver())
            .to_ascii_lowercase();

        let mut engines = self.engines.lock();
        if let Some(engine) = engines.get(&name) {
            return Ok(Arc::clone(engine));
        }

        let engine = Self::create(&name)?;
        debug!(driver = %name, "created search engine");
        engines.insert(name, Arc::clone(&engine));
        Ok(engine)
    }

    fn create(name: &str) -> Result<Arc<dyn Engine>> {
        match name {
            "database" => Ok(Arc::new(DatabaseEngine)),
            "collection" => Ok(Arc::new(CollectionEngine)),
            "null" => Ok(Arc::new(NullEngine)),
            hosted if HOSTED_DRIVERS.contains(&hosted) => Err(SearchError::Unsupported(format!(
                "the {hosted} driver needs a hosted search service"
            ))),
            other => Err(SearchError::UnknownDriver(other.to_string())),
        }
    }
}
