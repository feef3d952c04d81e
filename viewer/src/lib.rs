pub mod error;
pub mod navigate;
pub mod render;
pub mod server;

pub use error::ViewError;
pub use navigate::{Navigator, document_name, render_index};
pub use render::{Format, HtmlRenderer, MarkdownRenderer, RenderOptions, Renderer, TextRenderer};
