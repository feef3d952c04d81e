use std::fmt;

use crate::block::Block;

/// One guide: a named, titled, ordered sequence of blocks.
/// Built once by the store and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique store key (e.g. "style").
    pub name: String,
    /// Display title, from front matter or the first level-1 heading.
    pub title: String,
    /// One-line description from front matter, if any.
    pub summary: Option<String>,
    pub body: Vec<Block>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Number of code fences in the body.
    pub fn code_fence_count(&self) -> usize {
        self.body
            .iter()
            .filter(|b| matches!(b, Block::CodeFence { .. }))
            .count()
    }
}

/// Normalized Markdown. Blocks are separated by a blank line, except
/// consecutive list items, which stay together as one list.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<&Block> = None;
        for block in &self.body {
            if let Some(prev) = prev {
                let same_list =
                    matches!(prev, Block::ListItem { .. }) && matches!(block, Block::ListItem { .. });
                if !same_list {
                    writeln!(f)?;
                }
            }
            write!(f, "{}", block)?;
            prev = Some(block);
        }
        Ok(())
    }
}
