use guide::Document;

use crate::render::Renderer;

/// Normalized Markdown, straight from the block model's `Display` impls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, document: &Document) -> String {
        document.to_string()
    }

    fn content_type(&self) -> &'static str {
        "text/markdown; charset=utf-8"
    }
}
