use std::fmt::{self, Write};

/// One structural unit of a document.
/// Produced by the parser and never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    CodeFence {
        /// First word of the fence info string; `None` for bare and indented blocks.
        language: Option<String>,
        code: String,
    },
    /// A single list entry. Lists are flattened: nesting lives in `depth`
    /// (0 = top level), and `ordinal` is `Some(n)` for ordered lists.
    ListItem {
        depth: usize,
        ordinal: Option<u64>,
        content: Vec<Inline>,
    },
    Rule,
    /// A Markdown construct with no counterpart in this model, kept as the
    /// raw source text so it can still be shown literally.
    Unrecognized {
        kind: UnrecognizedKind,
        source: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecognizedKind {
    Table,
    BlockQuote,
    Html,
    FootnoteDefinition,
    Other,
}

impl UnrecognizedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnrecognizedKind::Table => "table",
            UnrecognizedKind::BlockQuote => "block quote",
            UnrecognizedKind::Html => "HTML block",
            UnrecognizedKind::FootnoteDefinition => "footnote definition",
            UnrecognizedKind::Other => "construct",
        }
    }
}

/// Inline elements that appear within a line of text.
/// Inline types nest freely within one another.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link {
        dest: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
}

impl Block {
    /// Short lowercase name of the variant, used in diagnostics and as a CSS class.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::CodeFence { .. } => "code",
            Block::ListItem { .. } => "list-item",
            Block::Rule => "rule",
            Block::Unrecognized { .. } => "unrecognized",
        }
    }

    /// Text content with all markup removed.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph(content)
            | Block::ListItem { content, .. } => plain_text(content),
            Block::CodeFence { code, .. } => code.clone(),
            Block::Rule => String::new(),
            Block::Unrecognized { source, .. } => source.clone(),
        }
    }
}

/// Concatenate the text of a run of inlines, dropping markup.
/// Breaks become single spaces.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(s) | Inline::Code(s) => out.push_str(s),
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Strikethrough(children) => push_plain_text(children, out),
            Inline::Link { content, .. } => push_plain_text(content, out),
            Inline::Image { alt, .. } => push_plain_text(alt, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
}

fn write_inlines(f: &mut fmt::Formatter<'_>, inlines: &[Inline]) -> fmt::Result {
    for inline in inlines {
        write!(f, "{}", inline)?;
    }
    Ok(())
}

/// ASCII punctuation that can start or end markup anywhere in a line.
const MARKDOWN_SPECIAL: &str = "\\`*_~[]<>#&|";

/// Write `s` so it parses back as the same literal text. A leading `-`, `+`
/// or `=` and the `.`/`)` after leading digits are escaped too, since `s` may
/// begin a line.
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    for (i, ch) in s.char_indices() {
        let marker = match ch {
            '-' | '+' | '=' => i == 0,
            '.' | ')' => digits > 0 && i == digits,
            _ => false,
        };
        if marker || MARKDOWN_SPECIAL.contains(ch) {
            f.write_char('\\')?;
        }
        f.write_char(ch)?;
    }
    Ok(())
}

/// Link and image destinations, wrapped in `<...>` when a bare one would not parse.
fn write_dest(f: &mut fmt::Formatter<'_>, dest: &str, title: &str) -> fmt::Result {
    if dest.is_empty() || dest.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>')) {
        f.write_char('<')?;
        for ch in dest.chars() {
            if matches!(ch, '<' | '>' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(ch)?;
        }
        f.write_char('>')?;
    } else {
        write!(f, "{}", dest)?;
    }
    if !title.is_empty() {
        f.write_str(" \"")?;
        for ch in title.chars() {
            if matches!(ch, '"' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(ch)?;
        }
        f.write_char('"')?;
    }
    Ok(())
}

/// Longest run of consecutive backticks in `s`.
fn longest_backtick_run(s: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for ch in s.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Heading { level, content } => {
                for _ in 0..*level {
                    write!(f, "#")?;
                }
                write!(f, " ")?;
                write_inlines(f, content)?;
                writeln!(f)
            }
            Block::Paragraph(inlines) => {
                write_inlines(f, inlines)?;
                writeln!(f)
            }
            Block::CodeFence { language, code } => {
                let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
                write!(f, "{}", fence)?;
                if let Some(lang) = language {
                    write!(f, "{}", lang)?;
                }
                writeln!(f)?;
                write!(f, "{}", code)?;
                if !code.is_empty() && !code.ends_with('\n') {
                    writeln!(f)?;
                }
                writeln!(f, "{}", fence)
            }
            Block::ListItem {
                depth,
                ordinal,
                content,
            } => {
                write!(f, "{}", "    ".repeat(*depth))?;
                match ordinal {
                    Some(n) => write!(f, "{}. ", n)?,
                    None => write!(f, "- ")?,
                }
                write_inlines(f, content)?;
                writeln!(f)
            }
            Block::Rule => writeln!(f, "---"),
            // Shown as a literal paragraph. Blank lines are dropped so the
            // source stays one paragraph.
            Block::Unrecognized { source, .. } => {
                let mut lines = source.lines().map(str::trim).filter(|l| !l.is_empty());
                if let Some(first) = lines.next() {
                    write_escaped(f, first)?;
                    for line in lines {
                        writeln!(f)?;
                        write_escaped(f, line)?;
                    }
                }
                writeln!(f)
            }
        }
    }
}

impl fmt::Display for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inline::Text(s) => write_escaped(f, s),
            Inline::Strong(children) => {
                write!(f, "**")?;
                write_inlines(f, children)?;
                write!(f, "**")
            }
            Inline::Emphasis(children) => {
                write!(f, "*")?;
                write_inlines(f, children)?;
                write!(f, "*")
            }
            Inline::Strikethrough(children) => {
                write!(f, "~~")?;
                write_inlines(f, children)?;
                write!(f, "~~")
            }
            Inline::Code(code) => {
                let ticks = "`".repeat(longest_backtick_run(code) + 1);
                if ticks.len() > 1 {
                    write!(f, "{} {} {}", ticks, code, ticks)
                } else {
                    write!(f, "`{}`", code)
                }
            }
            Inline::Link {
                dest,
                title,
                content,
            } => {
                write!(f, "[")?;
                write_inlines(f, content)?;
                write!(f, "](")?;
                write_dest(f, dest, title)?;
                write!(f, ")")
            }
            Inline::Image { dest, title, alt } => {
                write!(f, "![")?;
                write_inlines(f, alt)?;
                write!(f, "](")?;
                write_dest(f, dest, title)?;
                write!(f, ")")
            }
            Inline::SoftBreak => writeln!(f),
            Inline::HardBreak => writeln!(f, "\\"),
        }
    }
}
