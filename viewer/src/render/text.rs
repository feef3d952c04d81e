use guide::block::{Block, Inline, plain_text};
use guide::Document;

use crate::render::Renderer;

pub const DEFAULT_WIDTH: usize = 72;

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const STRIKE: &str = "\x1b[9m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Plain terminal text. Styling uses ANSI escapes only when `color` is set;
/// without it, inline markup keeps Markdown-like markers.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub color: bool,
    /// Width of horizontal rules.
    pub width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer {
            color: false,
            width: DEFAULT_WIDTH,
        }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        let mut prev: Option<&Block> = None;

        for block in &document.body {
            if let Some(prev) = prev {
                let same_list = matches!(prev, Block::ListItem { .. })
                    && matches!(block, Block::ListItem { .. });
                if !same_list {
                    out.push('\n');
                }
            }
            self.render_block(&mut out, block);
            prev = Some(block);
        }
        out
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}

impl TextRenderer {
    fn render_block(&self, out: &mut String, block: &Block) {
        match block {
            Block::Heading { level, content } => {
                let title = escape_controls(&plain_text(content));
                let underline = match level {
                    1 => Some('='),
                    2 => Some('-'),
                    _ => None,
                };
                match underline {
                    Some(ch) => {
                        let styles: &[&str] = if *level == 1 { &[BOLD, UNDERLINE] } else { &[BOLD] };
                        self.styled(out, styles, &title);
                        out.push('\n');
                        let rule: String = std::iter::repeat_n(ch, title.chars().count()).collect();
                        out.push_str(&rule);
                        out.push('\n');
                    }
                    None => {
                        let text = format!("{} {}", "#".repeat(*level as usize), title);
                        self.styled(out, &[BOLD], &text);
                        out.push('\n');
                    }
                }
            }
            Block::Paragraph(content) => {
                out.push_str(&self.inlines(content));
                out.push('\n');
            }
            Block::CodeFence { code, .. } => {
                for line in code.lines() {
                    out.push_str("    ");
                    self.styled(out, &[CYAN], &escape_controls(line));
                    out.push('\n');
                }
            }
            Block::ListItem {
                depth,
                ordinal,
                content,
            } => {
                let indent = "  ".repeat(*depth);
                let marker = match ordinal {
                    Some(n) => format!("{}. ", n),
                    None => "- ".to_string(),
                };
                let hang = " ".repeat(indent.len() + marker.chars().count());
                let body = self.inlines(content);
                out.push_str(&indent);
                out.push_str(&marker);
                for (i, line) in body.split('\n').enumerate() {
                    if i > 0 {
                        out.push('\n');
                        out.push_str(&hang);
                    }
                    out.push_str(line);
                }
                out.push('\n');
            }
            Block::Rule => {
                let rule = "-".repeat(self.width);
                self.styled(out, &[DIM], &rule);
                out.push('\n');
            }
            Block::Unrecognized { source, .. } => {
                out.push_str(&escape_controls(source));
                out.push('\n');
            }
        }
    }

    fn styled(&self, out: &mut String, styles: &[&str], text: &str) {
        if self.color {
            for style in styles {
                out.push_str(style);
            }
            out.push_str(text);
            out.push_str(RESET);
        } else {
            out.push_str(text);
        }
    }

    fn inlines(&self, inlines: &[Inline]) -> String {
        let mut writer = InlineWriter {
            color: self.color,
            active: Vec::new(),
            out: String::new(),
        };
        writer.push_all(inlines);
        writer.out
    }
}

/// Writes inline runs, re-applying enclosing ANSI styles after each reset
/// so nested markup keeps its parent's styling.
struct InlineWriter {
    color: bool,
    active: Vec<&'static str>,
    out: String,
}

impl InlineWriter {
    fn push_all(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.push(inline);
        }
    }

    fn push(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(s) => self.out.push_str(&escape_controls(s)),
            Inline::Strong(children) => self.wrap(BOLD, "**", children),
            Inline::Emphasis(children) => self.wrap(ITALIC, "_", children),
            Inline::Strikethrough(children) => self.wrap(STRIKE, "~~", children),
            Inline::Code(code) => {
                let code = escape_controls(code);
                if self.color {
                    self.enter(CYAN);
                    self.out.push_str(&code);
                    self.leave();
                } else {
                    self.out.push('`');
                    self.out.push_str(&code);
                    self.out.push('`');
                }
            }
            Inline::Link { dest, content, .. } => {
                if self.color {
                    self.enter(UNDERLINE);
                    self.push_all(content);
                    self.leave();
                } else {
                    self.push_all(content);
                }
                if plain_text(content) != *dest {
                    self.out.push_str(" <");
                    self.out.push_str(&escape_controls(dest));
                    self.out.push('>');
                }
            }
            Inline::Image { dest, alt, .. } => {
                self.out.push_str("[image: ");
                self.out.push_str(&escape_controls(&plain_text(alt)));
                self.out.push_str("] <");
                self.out.push_str(&escape_controls(dest));
                self.out.push('>');
            }
            Inline::SoftBreak | Inline::HardBreak => self.out.push('\n'),
        }
    }

    fn wrap(&mut self, style: &'static str, marker: &str, children: &[Inline]) {
        if self.color {
            self.enter(style);
            self.push_all(children);
            self.leave();
        } else {
            self.out.push_str(marker);
            self.push_all(children);
            self.out.push_str(marker);
        }
    }

    fn enter(&mut self, style: &'static str) {
        self.active.push(style);
        self.out.push_str(style);
    }

    fn leave(&mut self) {
        self.active.pop();
        self.out.push_str(RESET);
        for style in &self.active {
            self.out.push_str(style);
        }
    }
}

/// Make control characters visible so document text cannot drive the
/// terminal. Newlines and tabs pass through.
pub fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() && ch != '\n' && ch != '\t' {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}
