pub mod html;
pub mod markdown;
pub mod text;

use guide::Document;
use serde::Deserialize;

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
pub use text::TextRenderer;

/// Turns a document into one output representation.
///
/// Rendering is pure: the same document always produces the same bytes,
/// blocks appear in source order, and no block can fail the document.
pub trait Renderer {
    fn render(&self, document: &Document) -> String;

    /// MIME type of the output, for HTTP responses.
    fn content_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Terminal text, optionally with ANSI styling.
    #[default]
    Text,
    Html,
    /// Normalized Markdown.
    Markdown,
}

/// Knobs shared by the renderers; each one reads the fields it needs.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub color: bool,
    pub width: usize,
    pub standalone: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            color: false,
            width: text::DEFAULT_WIDTH,
            standalone: false,
        }
    }
}

impl Format {
    pub fn renderer(self, options: &RenderOptions) -> Box<dyn Renderer + Send + Sync> {
        match self {
            Format::Text => Box::new(TextRenderer {
                color: options.color,
                width: options.width,
            }),
            Format::Html => Box::new(HtmlRenderer {
                standalone: options.standalone,
                index_href: None,
            }),
            Format::Markdown => Box::new(MarkdownRenderer),
        }
    }
}
