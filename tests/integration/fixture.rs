//! Shared fixtures: a throwaway theme tree plus registry wiring.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use cms_search::content::ThemeContent;
use cms_search::index::{IndexRegistry, IndexSettings};
use cms_search::models::{ContentModelOptions, VirtualContentModel};

pub struct ThemeFixture {
    pub dir: TempDir,
}

impl ThemeFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn themes_root(&self) -> PathBuf {
        self.dir.path().join("themes")
    }

    pub fn storage(&self) -> PathBuf {
        self.dir.path().join("storage")
    }

    /// Write `body` to `themes/<theme>/<dir>/<file>`.
    pub fn write(&self, theme: &str, dir: &str, file: &str, body: &str) -> &Self {
        let path = self.themes_root().join(theme).join(dir).join(file);
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create content dir");
        fs::write(path, body).expect("write content file");
        self
    }

    pub fn page(&self, file: &str, title: &str, markup: &str) -> &Self {
        self.write("demo", "pages", file, &format!("title = \"{title}\"\n==\n{markup}\n"))
    }

    pub fn registry(&self) -> IndexRegistry {
        IndexRegistry::new(IndexSettings {
            index_dir: Some(self.storage()),
            ..IndexSettings::default()
        })
    }

    pub fn pages(&self, registry: &IndexRegistry) -> VirtualContentModel {
        self.content(registry, "pages", ContentModelOptions::default())
    }

    pub fn content(
        &self,
        registry: &IndexRegistry,
        dir: &str,
        options: ContentModelOptions,
    ) -> VirtualContentModel {
        VirtualContentModel::new(
            registry,
            Arc::new(ThemeContent::new(self.themes_root(), dir)),
            "demo",
            options,
        )
    }

    pub fn store_file(&self, name: &str) -> PathBuf {
        self.storage().join(format!("{name}.sqlite"))
    }
}

pub fn sqlite_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sqlite"))
        .collect();
    files.sort();
    files
}
