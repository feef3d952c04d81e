pub mod error;
mod frontmatter;
mod structural;

pub use error::ParseError;
pub use frontmatter::FrontMatter;

use crate::block::{Block, plain_text};

/// A successfully parsed guide source, before it is given a store name.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub title: String,
    pub summary: Option<String>,
    pub blocks: Vec<Block>,
    /// Non-fatal diagnostics (unrecognized constructs, skipped heading levels).
    pub warnings: Vec<ParseError>,
}

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source Markdown (with optional front matter) into blocks.
    pub fn parse(&self) -> Result<Parsed, Vec<ParseError>> {
        let (front, body, offset) = frontmatter::split(&self.source, self.file_id)
            .map_err(|e| vec![e])?;

        let (blocks, warnings) = structural::parse_blocks(body, self.file_id);
        let warnings: Vec<ParseError> = warnings.into_iter().map(|w| w.offset_by(offset)).collect();

        let title = front.title.clone().or_else(|| {
            blocks.iter().find_map(|b| match b {
                Block::Heading { level: 1, content } => Some(plain_text(content)),
                _ => None,
            })
        });
        let title = title
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty());

        let Some(title) = title else {
            return Err(vec![
                ParseError::error("document has no title", 0..self.source.len().min(1), self.file_id)
                    .with_note("start the document with a `# Title` heading")
                    .with_note("or set `title` in the front matter"),
            ]);
        };

        Ok(Parsed {
            title,
            summary: front.summary,
            blocks,
            warnings,
        })
    }
}
