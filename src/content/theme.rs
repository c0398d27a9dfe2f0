//! Theme object directories on disk.
//!
//! Layout: `<themes_root>/<theme>/<dir_name>/**/<file>`. Template files
//! (`.htm`) are split into an INI settings section, an optional code section
//! and markup, separated by `==` lines. Other files are plain content.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::Attributes;
use crate::error::{Result, SearchError};

use super::{ContentEnumerator, ContentItem};

const DEFAULT_EXTENSIONS: &[&str] = &["htm", "md", "txt"];

#[derive(Debug, Clone)]
pub struct ThemeContent {
    themes_root: PathBuf,
    dir_name: String,
    extensions: Vec<String>,
    definition: Option<PathBuf>,
}

impl ThemeContent {
    pub fn new(themes_root: impl Into<PathBuf>, dir_name: impl Into<String>) -> Self {
        Self {
            themes_root: themes_root.into(),
            dir_name: dir_name.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            definition: None,
        }
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_definition(mut self, path: impl Into<PathBuf>) -> Self {
        self.definition = Some(path.into());
        self
    }

    pub fn object_dir(&self, theme: &str) -> PathBuf {
        self.themes_root.join(theme).join(&self.dir_name)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn read_item(&self, dir: &Path, path: &Path) -> Result<ContentItem> {
        let relative = path.strip_prefix(dir).map_err(|_| SearchError::Content {
            path: path.display().to_string(),
            reason: "not inside the object directory".to_string(),
        })?;
        let file_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let raw = fs::read_to_string(path).map_err(|e| SearchError::Content {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut attributes = parse_object(&file_name, &extension, &raw);
        if let Some(mtime) = fs::metadata(path).ok().and_then(|m| m.modified().ok()) {
            attributes.insert("mtime".to_string(), Value::from(unix_seconds(mtime)));
        }
        Ok(ContentItem::new(file_name, attributes))
    }
}

impl ContentEnumerator for ThemeContent {
    fn type_name(&self) -> &str {
        &self.dir_name
    }

    fn list_all(&self, theme: &str, include_variants: bool) -> Result<Vec<ContentItem>> {
        let dir = self.object_dir(theme);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let max_depth = if include_variants { usize::MAX } else { 1 };
        let mut items = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| walk_error(&dir, &err))?;
            if entry.file_type().is_file() && self.accepts(entry.path()) {
                items.push(self.read_item(&dir, entry.path())?);
            }
        }
        Ok(items)
    }

    fn load(&self, theme: &str, file_name: &str) -> Result<Option<ContentItem>> {
        let relative = Path::new(file_name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SearchError::Content {
                path: file_name.to_string(),
                reason: "file name escapes the object directory".to_string(),
            });
        }

        let dir = self.object_dir(theme);
        let path = dir.join(relative);
        if !path.is_file() || !self.accepts(&path) {
            return Ok(None);
        }
        self.read_item(&dir, &path).map(Some)
    }

    fn definition_path(&self) -> Option<PathBuf> {
        self.definition.clone()
    }

    /// Includes directory mtimes so removed files are noticed too.
    fn last_modified(&self, theme: &str) -> Option<SystemTime> {
        WalkDir::new(self.object_dir(theme))
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry in mtime scan");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir() || self.accepts(entry.path()))
            .filter_map(|entry| entry.metadata().ok())
            .filter_map(|meta| meta.modified().ok())
            .max()
    }
}

fn walk_error(dir: &Path, err: &walkdir::Error) -> SearchError {
    let path = err.path().unwrap_or(dir);
    SearchError::Content {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Parse a content file into attributes.
///
/// Always sets `fileName`, `markup` and `content` (the raw file). Template
/// settings become top-level attributes; `[section]` groups become nested
/// objects.
pub fn parse_object(file_name: &str, extension: &str, raw: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("fileName".to_string(), Value::from(file_name));

    let markup = if matches!(extension, "htm" | "html") {
        let mut sections = split_sections(raw);
        let markup = sections.pop().unwrap_or_default();
        let settings = if sections.is_empty() {
            Attributes::new()
        } else {
            parse_settings(&sections.remove(0))
        };
        if let Some(code) = sections.pop() {
            attributes.insert("code".to_string(), Value::from(code.trim()));
        }
        for (key, value) in settings {
            attributes.entry(key).or_insert(value);
        }
        markup
    } else {
        raw.to_string()
    };

    if extension == "md" && !attributes.contains_key("title") {
        if let Some(title) = markup
            .lines()
            .find_map(|line| line.trim().strip_prefix("# "))
        {
            attributes.insert("title".to_string(), Value::from(title.trim()));
        }
    }

    attributes.insert("markup".to_string(), Value::from(markup.trim()));
    attributes.insert("content".to_string(), Value::from(raw));
    attributes
}

/// Split on lines made only of two or more `=`. At most three sections;
/// anything past the second separator belongs to the markup.
fn split_sections(raw: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    for line in raw.lines() {
        let trimmed = line.trim();
        let is_separator = trimmed.len() >= 2 && trimmed.bytes().all(|b| b == b'=');
        if is_separator && sections.len() < 3 {
            sections.push(String::new());
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    sections
}

/// Minimal INI reader for template settings.
fn parse_settings(raw: &str) -> Attributes {
    let mut root = Attributes::new();
    let mut section: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            root.entry(name.clone())
                .or_insert_with(|| Value::Object(Attributes::new()));
            section = Some(name);
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = Value::from(unquote(value.trim()));

        match section.as_ref().and_then(|name| root.get_mut(name)) {
            Some(Value::Object(group)) => {
                group.insert(key, value);
            }
            _ => {
                root.insert(key, value);
            }
        }
    }
    root
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map_or_else(|| value.to_string(), |inner| inner.replace("\\\"", "\""))
}

fn unix_seconds(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
