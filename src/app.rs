//! Shared state for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::Cli;
use crate::config::Config;
use crate::content::ThemeContent;
use crate::error::Result;
use crate::index::{IndexRegistry, IndexSettings};
use crate::models::{ContentModelOptions, VirtualContentModel};
use crate::search::SearchContext;

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub project_root: PathBuf,
    pub registry: IndexRegistry,
    pub search: SearchContext,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        Ok(Self::new(config, project_root, cli.robot))
    }

    pub fn new(config: Config, project_root: PathBuf, robot_mode: bool) -> Self {
        let registry = IndexRegistry::new(IndexSettings {
            index_dir: config
                .index
                .path
                .as_deref()
                .map(|path| resolve(&project_root, path)),
            prefix: config.search.prefix.clone(),
            lock_timeout: config.index.lock_timeout(),
        });
        Self {
            search: SearchContext::new(config.search.clone()),
            registry,
            project_root,
            config,
            robot_mode,
        }
    }

    pub fn themes_root(&self) -> PathBuf {
        resolve(&self.project_root, &self.config.theme.root)
    }

    /// Theme content of one object directory, as a searchable model.
    pub fn content_model(
        &self,
        type_name: &str,
        theme: Option<&str>,
        include_variants: bool,
    ) -> VirtualContentModel {
        let theme = theme.unwrap_or(&self.config.theme.active);
        let mut content = ThemeContent::new(self.themes_root(), type_name);
        if let Some(definition) = &self.config.index.definition {
            content = content.with_definition(resolve(&self.project_root, definition));
        }
        let enumerator = Arc::new(content);
        VirtualContentModel::new(
            &self.registry,
            enumerator,
            theme,
            ContentModelOptions {
                include_variants,
                ..ContentModelOptions::default()
            },
        )
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn content_model_watches_definition_file() {
        let dir = tempdir().unwrap();
        let pages = dir.path().join("themes/demo/pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("home.htm"), "title = \"Home\"\n==\n<p>Welcome</p>").unwrap();
        fs::write(dir.path().join("search.toml"), "[theme]\nactive = \"demo\"\n").unwrap();

        let mut config = Config::default();
        config.theme.active = "demo".into();
        config.index.path = Some(PathBuf::from("storage"));
        config.index.definition = Some(PathBuf::from("search.toml"));
        let app = AppContext::new(config, dir.path().to_path_buf(), false);

        let model = app.content_model("pages", None, false);
        model.index().ensure_fresh().unwrap();
        assert!(!model.index().needs_update());

        let file = fs::OpenOptions::new()
            .write(true)
            .open(dir.path().join("search.toml"))
            .unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(120)).unwrap();
        assert!(model.index().needs_update());
    }
}
