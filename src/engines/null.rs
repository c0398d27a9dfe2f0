use crate::core::SearchableRecord;
use crate::error::Result;
use crate::models::SearchableModel;

use super::{Engine, QuerySpec};

/// Finds nothing and accepts every write. Used when search is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl Engine for NullEngine {
    fn name(&self) -> &'static str {
        "null"
    }

    fn search(&self, _model: &dyn SearchableModel, _spec: &QuerySpec) -> Result<Vec<SearchableRecord>> {
        Ok(Vec::new())
    }

    fn count(&self, _model: &dyn SearchableModel, _spec: &QuerySpec) -> Result<usize> {
        Ok(0)
    }

    fn create_index(&self, _name: &str, _key: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn delete_index(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}
