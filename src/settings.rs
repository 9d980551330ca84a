//! Settings infrastructure for docsim.
//!
//! This module loads `settings.toml` to configure the index unit, the batch
//! size limit, and documents to seed into storage at startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::{self, Document, IndexUnit};

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Document model configuration.
    #[serde(default)]
    pub documents: DocumentSettings,

    /// Documents created before the first request is served.
    #[serde(default)]
    pub seed: Vec<SeedDocument>,
}

/// Document model settings.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentSettings {
    /// Unit in which indices are counted: "utf16" (default) or "char".
    #[serde(default)]
    pub index_unit: IndexUnit,

    /// Upper bound on requests per batch update. Unlimited when absent.
    pub max_batch_requests: Option<usize>,
}

/// A document to seed into storage.
#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    pub document_id: String,
    pub title: String,
    /// Revision id to start from. Generated when absent.
    pub revision_id: Option<String>,
    /// Inline body text.
    pub content: Option<String>,
    /// File holding the body text, relative to the settings directory.
    pub content_file: Option<PathBuf>,
}

impl SeedDocument {
    /// Build the seeded document, resolving `content_file` against `settings_dir`.
    ///
    /// Returns None (with a warning) if the content file cannot be read.
    pub fn to_document(&self, settings_dir: &Path, unit: IndexUnit) -> Option<Document> {
        let text = match (&self.content, &self.content_file) {
            (Some(content), _) => content.clone(),
            (None, Some(path)) => {
                let full_path = if path.is_absolute() {
                    path.clone()
                } else {
                    settings_dir.join(path)
                };
                match std::fs::read_to_string(&full_path) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            "failed to read seed content '{}': {}",
                            full_path.display(),
                            e
                        );
                        return None;
                    }
                }
            }
            (None, None) => String::new(),
        };

        let revision_id = self
            .revision_id
            .clone()
            .unwrap_or_else(document::new_revision_id);
        Some(document::from_text(
            self.document_id.as_str(),
            self.title.as_str(),
            revision_id,
            &text,
            unit,
        ))
    }
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("failed to parse {}: {}", path.display(), e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

const SETTINGS_FILE: &str = "settings.toml";

/// Directory holding the settings file that applies to `start_dir`.
///
/// The nearest ancestor (including `start_dir` itself) wins. Failing that,
/// the first immediate subdirectory by name that holds one.
fn find_settings_dir(start_dir: &Path) -> Option<PathBuf> {
    if let Some(dir) = start_dir
        .ancestors()
        .find(|dir| dir.join(SETTINGS_FILE).is_file())
    {
        return Some(dir.to_path_buf());
    }

    let mut children: Vec<PathBuf> = std::fs::read_dir(start_dir)
        .ok()?
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
        .map(|entry| entry.path())
        .collect();
    children.sort();
    children
        .into_iter()
        .find(|dir| dir.join(SETTINGS_FILE).is_file())
}

/// Find and load the settings that apply to `start_dir`.
///
/// Returns the settings with the directory they came from, against which
/// relative seed paths resolve. Without a settings file this is the default
/// settings and `start_dir`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    match find_settings_dir(start_dir) {
        Some(dir) => {
            tracing::debug!("using {}", dir.join(SETTINGS_FILE).display());
            (load_settings(&dir.join(SETTINGS_FILE)), dir)
        }
        None => (Settings::default(), start_dir.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a unique temp directory for test isolation.
    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("docsim-test")
            .join(name)
            .join(format!("{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup_test_dir(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.documents.index_unit, IndexUnit::Utf16);
        assert!(settings.documents.max_batch_requests.is_none());
        assert!(settings.seed.is_empty());
    }

    #[test]
    fn parse_document_settings() {
        let settings: Settings = toml::from_str(
            r#"
[documents]
index_unit = "char"
max_batch_requests = 10
"#,
        )
        .unwrap();
        assert_eq!(settings.documents.index_unit, IndexUnit::Char);
        assert_eq!(settings.documents.max_batch_requests, Some(10));
    }

    #[test]
    fn parse_unknown_unit_fails() {
        let result: Result<Settings, _> = toml::from_str("[documents]\nindex_unit = \"bytes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn seed_inline_content() {
        let settings: Settings = toml::from_str(
            r#"
[[seed]]
document_id = "DOC001"
title = "Project Proposal"
revision_id = "REV001"
content = "This is the project proposal."
"#,
        )
        .unwrap();
        let doc = settings.seed[0]
            .to_document(Path::new("."), IndexUnit::Utf16)
            .unwrap();
        assert_eq!(doc.document_id, "DOC001");
        assert_eq!(doc.revision_id, "REV001");
        assert_eq!(doc.body.text(), "This is the project proposal.\n");
        assert_eq!(doc.body.end_index(), 31);
    }

    #[test]
    fn seed_content_file_relative_to_settings_dir() {
        let dir = make_test_dir("seed-file");
        std::fs::write(dir.join("notes.txt"), "line one\nline two\n").unwrap();

        let seed = SeedDocument {
            document_id: "DOC002".to_string(),
            title: "Notes".to_string(),
            revision_id: None,
            content: None,
            content_file: Some(PathBuf::from("notes.txt")),
        };
        let doc = seed.to_document(&dir, IndexUnit::Utf16).unwrap();
        assert_eq!(doc.body.content.len(), 2);
        assert_eq!(doc.revision_id.len(), 16);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn seed_missing_file_is_skipped() {
        let seed = SeedDocument {
            document_id: "DOC003".to_string(),
            title: "Missing".to_string(),
            revision_id: None,
            content: None,
            content_file: Some(PathBuf::from("/nonexistent/docsim/seed.txt")),
        };
        assert!(seed.to_document(Path::new("."), IndexUnit::Utf16).is_none());
    }

    #[test]
    fn discover_settings_in_current_dir() {
        let dir = make_test_dir("discover-current");
        std::fs::write(
            dir.join("settings.toml"),
            "[documents]\nindex_unit = \"char\"\n",
        )
        .unwrap();

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert_eq!(settings.documents.index_unit, IndexUnit::Char);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn discover_settings_in_parent_dir() {
        let parent = make_test_dir("discover-parent");
        let child = parent.join("subdir");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(
            parent.join("settings.toml"),
            "[documents]\nmax_batch_requests = 3\n",
        )
        .unwrap();

        let (settings, settings_dir) = discover_settings(&child);
        assert_eq!(settings_dir, parent);
        assert_eq!(settings.documents.max_batch_requests, Some(3));

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_in_child_dir() {
        let parent = make_test_dir("discover-child");
        let child = parent.join("config");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(
            child.join("settings.toml"),
            "[[seed]]\ndocument_id = \"a\"\ntitle = \"A\"\n",
        )
        .unwrap();

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, child);
        assert_eq!(settings.seed.len(), 1);

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_prefers_first_child_by_name() {
        let parent = make_test_dir("discover-children");
        for (name, limit) in [("zeta", 9), ("alpha", 2)] {
            let child = parent.join(name);
            std::fs::create_dir_all(&child).unwrap();
            std::fs::write(
                child.join("settings.toml"),
                format!("[documents]\nmax_batch_requests = {}\n", limit),
            )
            .unwrap();
        }

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, parent.join("alpha"));
        assert_eq!(settings.documents.max_batch_requests, Some(2));

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_without_file_uses_defaults() {
        let dir = make_test_dir("discover-none");
        std::fs::create_dir_all(dir.join("empty")).unwrap();

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert!(settings.seed.is_empty());
        assert_eq!(settings.documents.max_batch_requests, None);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn malformed_settings_fall_back_to_default() {
        let dir = make_test_dir("malformed");
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[documents\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.documents.index_unit, IndexUnit::Utf16);

        cleanup_test_dir(&dir);
    }
}
