mod bundled;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use codespan_reporting::files::SimpleFiles;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::StoreError;
use crate::parser::{ParseError, Parser};

/// The fixed set of guides, keyed by name.
///
/// Built once through [`StoreBuilder`] and read-only afterwards, so a store
/// can be shared between threads without locking.
#[derive(Debug)]
pub struct DocumentStore {
    documents: BTreeMap<String, Document>,
    files: SimpleFiles<String, String>,
    diagnostics: Vec<ParseError>,
}

impl DocumentStore {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// A store holding only the guides compiled into the binary.
    pub fn bundled() -> Self {
        let mut builder = StoreBuilder::new();
        builder.add_bundled();
        builder.build()
    }

    /// Document names in ascending order.
    pub fn list_documents(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(|s| s.as_str())
    }

    /// Documents in name order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Exact-name lookup. A case-insensitive match is offered as a suggestion
    /// in the error, never returned.
    pub fn get_document(&self, name: &str) -> Result<&Document, StoreError> {
        self.documents.get(name).ok_or_else(|| {
            let lower = name.to_lowercase();
            let suggestion = self
                .documents
                .keys()
                .find(|k| k.to_lowercase() == lower)
                .cloned();
            StoreError::NotFound {
                name: name.to_string(),
                suggestion,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Source database for rendering diagnostics with codespan-reporting.
    pub fn files(&self) -> &SimpleFiles<String, String> {
        &self.files
    }

    /// Parse warnings and errors gathered while loading, in load order.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }
}

/// Accumulates guide sources before freezing them into a [`DocumentStore`].
///
/// A source that fails to parse is recorded in the diagnostics and left out.
/// A later source with an existing name replaces the earlier document.
pub struct StoreBuilder {
    documents: BTreeMap<String, Document>,
    files: SimpleFiles<String, String>,
    diagnostics: Vec<ParseError>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder {
            documents: BTreeMap::new(),
            files: SimpleFiles::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Add the guides compiled into the binary.
    pub fn add_bundled(&mut self) -> &mut Self {
        for (name, origin, source) in bundled::BUNDLED {
            self.insert(name, origin.to_string(), source.to_string());
        }
        self
    }

    /// Add one source under `name`. `origin` labels the source in diagnostics.
    /// Returns whether the source parsed and was stored.
    pub fn add_source(
        &mut self,
        name: &str,
        origin: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<bool, StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.insert(name, origin.into(), source.into()))
    }

    /// Add every `*.md` file directly inside `dir`, named by file stem.
    /// Files whose stem is not a valid name are skipped. Returns the number
    /// of documents stored.
    pub fn add_dir(&mut self, dir: &Path) -> Result<usize, StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StoreError::Io { path, source }
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err(dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        let mut added = 0;
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_name(name) {
                warn!(path = %path.display(), "skipping guide with invalid name");
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(io_err(path.as_path()))?;
            if self.insert(name, path.display().to_string(), source) {
                added += 1;
            }
        }
        debug!(dir = %dir.display(), added, "loaded guide directory");
        Ok(added)
    }

    pub fn build(self) -> DocumentStore {
        DocumentStore {
            documents: self.documents,
            files: self.files,
            diagnostics: self.diagnostics,
        }
    }

    fn insert(&mut self, name: &str, origin: String, source: String) -> bool {
        let file_id = self.files.add(origin, source.clone());
        let parsed = match Parser::new(source, file_id).parse() {
            Ok(parsed) => parsed,
            Err(errors) => {
                warn!(guide = name, errors = errors.len(), "guide failed to parse");
                self.diagnostics.extend(errors);
                return false;
            }
        };
        self.diagnostics.extend(parsed.warnings);

        let document = Document {
            name: name.to_string(),
            title: parsed.title,
            summary: parsed.summary,
            body: parsed.blocks,
            source_id: file_id,
        };
        debug!(guide = name, title = %document.title, blocks = document.body.len(), "loaded guide");

        if let Some(old) = self.documents.insert(name.to_string(), document) {
            info!(guide = name, "guide replaces an earlier source with the same name");
            self.diagnostics.retain(|d| d.file_id != old.source_id);
        }
        true
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Names double as URL path segments and file stems.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::is_valid_name;

    #[test]
    fn names_are_lowercase_path_segments() {
        assert!(is_valid_name("style"));
        assert!(is_valid_name("c-security_2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Style"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("style.md"));
    }
}
