use std::io::Write;

use guide::{Document, DocumentStore, StoreError};

use crate::error::ViewError;
use crate::render::Renderer;
use crate::render::html::escape;

/// Suffixes accepted after a document name in a request.
const EXTENSIONS: &[&str] = &[".html", ".md", ".txt"];

/// Map a CLI argument or request path to a document name.
///
/// `style`, `/style`, `/docs/style`, `docs/style/`, `style.html` and
/// `style.md` all name `style`. Anything that still contains a path
/// separator after stripping is rejected.
pub fn document_name(request: &str) -> Option<&str> {
    let path = request.trim().trim_matches('/');
    let path = path.strip_prefix("docs/").unwrap_or(path);
    let path = path.trim_end_matches('/');
    let name = EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path);

    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        None
    } else {
        Some(name)
    }
}

/// Resolves requests against a store and writes rendered documents.
pub struct Navigator<'a> {
    store: &'a DocumentStore,
}

impl<'a> Navigator<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Navigator { store }
    }

    pub fn resolve(&self, request: &str) -> Result<&'a Document, ViewError> {
        let Some(name) = document_name(request) else {
            return Err(StoreError::NotFound {
                name: request.to_string(),
                suggestion: None,
            }
            .into());
        };
        Ok(self.store.get_document(name)?)
    }

    /// Resolve `request`, render it and write the result to `out`.
    pub fn show(
        &self,
        request: &str,
        renderer: &dyn Renderer,
        out: &mut dyn Write,
    ) -> Result<&'a Document, ViewError> {
        let document = self.resolve(request)?;
        out.write_all(renderer.render(document).as_bytes())?;
        Ok(document)
    }

    /// One document name per line; `long` adds titles and summaries.
    pub fn list(&self, out: &mut dyn Write, long: bool) -> Result<(), ViewError> {
        if !long {
            for name in self.store.list_documents() {
                writeln!(out, "{}", name)?;
            }
            return Ok(());
        }

        let width = self.store.list_documents().map(str::len).max().unwrap_or(0);
        for doc in self.store.documents() {
            write!(out, "{:<width$}  {}", doc.name, doc.title, width = width)?;
            if let Some(summary) = &doc.summary {
                write!(out, "  - {}", summary)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// HTML index page linking every document.
pub fn render_index(store: &DocumentStore) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Guides</title>\n</head>\n<body>\n<h1>Guides</h1>\n<ul>\n");
    for doc in store.documents() {
        out.push_str("<li><a href=\"/docs/");
        out.push_str(&doc.name);
        out.push_str("\">");
        escape(&mut out, &doc.title);
        out.push_str("</a>");
        if let Some(summary) = &doc.summary {
            out.push_str(": ");
            escape(&mut out, summary);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::document_name;

    #[test]
    fn request_paths_resolve_to_names() {
        assert_eq!(document_name("style"), Some("style"));
        assert_eq!(document_name("/style"), Some("style"));
        assert_eq!(document_name("/docs/style"), Some("style"));
        assert_eq!(document_name("docs/style/"), Some("style"));
        assert_eq!(document_name("style.html"), Some("style"));
        assert_eq!(document_name("/docs/security.md"), Some("security"));
        assert_eq!(document_name(" style "), Some("style"));
    }

    #[test]
    fn unaddressable_paths_are_rejected() {
        assert_eq!(document_name(""), None);
        assert_eq!(document_name("/"), None);
        assert_eq!(document_name("a/b"), None);
        assert_eq!(document_name("../style"), None);
        assert_eq!(document_name(".md"), None);
    }
}
