use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::block::{Block, Inline, UnrecognizedKind};
use crate::parser::error::ParseError;

type Spanned<'a> = (Event<'a>, Range<usize>);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse Markdown text into a flat block sequence plus warnings.
///
/// Markdown has no invalid input, so this never fails: constructs the block
/// model cannot express come back as `Block::Unrecognized` with a warning.
pub fn parse_blocks(source: &str, file_id: usize) -> (Vec<Block>, Vec<ParseError>) {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<Spanned<'_>> = parser.into_offset_iter().collect();

    let mut state = ParseState::new(source, file_id);
    state.process_events(&events);
    (state.blocks, state.warnings)
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    blocks: Vec<Block>,
    warnings: Vec<ParseError>,
    last_heading_level: Option<u8>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        ParseState {
            source,
            file_id,
            blocks: Vec::new(),
            warnings: Vec::new(),
            last_heading_level: None,
        }
    }

    fn process_events(&mut self, events: &[Spanned<'_>]) {
        let mut i = 0;

        while i < events.len() {
            let (ref ev, ref range) = events[i];

            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    let level = heading_level_to_u8(level);
                    i += 1;
                    let content = collect_inlines(events, &mut i, &|e| {
                        matches!(e, TagEnd::Heading(_))
                    });
                    self.check_heading_level(level, range.clone());
                    self.blocks.push(Block::Heading { level, content });
                }

                Event::Start(Tag::Paragraph) => {
                    i += 1;
                    let content = collect_inlines(events, &mut i, &|e| {
                        matches!(e, TagEnd::Paragraph)
                    });
                    self.blocks.push(Block::Paragraph(content));
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    i += 1;
                    let block = collect_code_block(kind, events, &mut i);
                    self.blocks.push(block);
                }

                Event::Start(Tag::List(start)) => {
                    i += 1;
                    self.collect_list(events, &mut i, 0, *start);
                }

                Event::Rule => {
                    self.blocks.push(Block::Rule);
                    i += 1;
                }

                Event::Start(tag) => {
                    let kind = unrecognized_kind(tag);
                    self.push_unrecognized(kind, events, &mut i, range.clone());
                }

                _ => {
                    i += 1;
                }
            }
        }
    }

    /// Flatten a list into `ListItem` blocks. `*i` points just past `Start(List)`.
    fn collect_list(
        &mut self,
        events: &[Spanned<'_>],
        i: &mut usize,
        depth: usize,
        start: Option<u64>,
    ) {
        let mut ordinal = start;

        while *i < events.len() {
            let (ref ev, _) = events[*i];
            match ev {
                Event::End(TagEnd::List(_)) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Item) => {
                    *i += 1;
                    self.collect_item(events, i, depth, ordinal);
                    if let Some(n) = ordinal.as_mut() {
                        *n += 1;
                    }
                }
                _ => {
                    *i += 1;
                }
            }
        }
    }

    /// Collect one list item. Nested blocks (sub-lists, code) are emitted
    /// after the item's own text so block order follows the source.
    fn collect_item(
        &mut self,
        events: &[Spanned<'_>],
        i: &mut usize,
        depth: usize,
        ordinal: Option<u64>,
    ) {
        let mut item = PendingItem {
            depth,
            ordinal,
            content: Vec::new(),
            emitted: false,
        };

        while *i < events.len() {
            let (ref ev, ref range) = events[*i];
            match ev {
                Event::End(TagEnd::Item) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Paragraph) => {
                    *i += 1;
                    let inlines = collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
                    if !item.content.is_empty() {
                        item.content.push(Inline::HardBreak);
                    }
                    item.content.extend(inlines);
                }
                Event::Start(Tag::List(start)) => {
                    item.flush(&mut self.blocks);
                    *i += 1;
                    self.collect_list(events, i, depth + 1, *start);
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    item.flush(&mut self.blocks);
                    *i += 1;
                    let block = collect_code_block(kind, events, i);
                    self.blocks.push(block);
                }
                Event::Rule => {
                    item.flush(&mut self.blocks);
                    self.blocks.push(Block::Rule);
                    *i += 1;
                }
                _ => {
                    if !push_inline(events, i, &mut item.content) {
                        if let Event::Start(tag) = ev {
                            item.flush(&mut self.blocks);
                            let kind = unrecognized_kind(tag);
                            self.push_unrecognized(kind, events, i, range.clone());
                        } else {
                            *i += 1;
                        }
                    }
                }
            }
        }

        item.flush(&mut self.blocks);
    }

    /// Skip an element the model has no variant for, keeping its raw source.
    /// `*i` points at the element's `Start` event.
    fn push_unrecognized(
        &mut self,
        kind: UnrecognizedKind,
        events: &[Spanned<'_>],
        i: &mut usize,
        range: Range<usize>,
    ) {
        skip_element(events, i);
        let source = self.source[range.clone()].trim_end_matches(['\n', '\r']).to_string();
        self.warnings.push(
            ParseError::warning(
                format!("{} is not supported and will be shown as literal text", kind.as_str()),
                range,
                self.file_id,
            )
            .with_note("supported blocks: headings, paragraphs, code fences, lists, rules"),
        );
        self.blocks.push(Block::Unrecognized { kind, source });
    }

    fn check_heading_level(&mut self, level: u8, span: Range<usize>) {
        if let Some(prev) = self.last_heading_level {
            if level > prev + 1 {
                self.warnings.push(ParseError::warning(
                    format!("heading level jumps from {} to {}", prev, level),
                    span,
                    self.file_id,
                ));
            }
        }
        self.last_heading_level = Some(level);
    }
}

/// A list item whose text is still being collected.
struct PendingItem {
    depth: usize,
    ordinal: Option<u64>,
    content: Vec<Inline>,
    /// Whether the `ListItem` block has been pushed already.
    emitted: bool,
}

impl PendingItem {
    /// Push the collected text. The first flush produces the `ListItem`;
    /// text that follows a nested block becomes a plain paragraph.
    fn flush(&mut self, blocks: &mut Vec<Block>) {
        let content = std::mem::take(&mut self.content);
        if !self.emitted {
            blocks.push(Block::ListItem {
                depth: self.depth,
                ordinal: self.ordinal,
                content,
            });
            self.emitted = true;
        } else if !content.is_empty() {
            blocks.push(Block::Paragraph(content));
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn unrecognized_kind(tag: &Tag<'_>) -> UnrecognizedKind {
    match tag {
        Tag::Table(_) => UnrecognizedKind::Table,
        Tag::BlockQuote(_) => UnrecognizedKind::BlockQuote,
        Tag::HtmlBlock => UnrecognizedKind::Html,
        Tag::FootnoteDefinition(_) => UnrecognizedKind::FootnoteDefinition,
        _ => UnrecognizedKind::Other,
    }
}

/// Advance past a whole element, nested tags included.
/// `*i` points at the element's `Start` event.
fn skip_element(events: &[Spanned<'_>], i: &mut usize) {
    let mut depth = 0usize;
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ if depth == 0 => break,
            _ => {}
        }
    }
}

/// Collect a code block's text. `*i` points just past `Start(CodeBlock)`.
fn collect_code_block(kind: &CodeBlockKind<'_>, events: &[Spanned<'_>], i: &mut usize) -> Block {
    let language = match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    };
    let mut code = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::End(TagEnd::CodeBlock) => break,
            Event::Text(s) => code.push_str(s),
            _ => {}
        }
    }
    Block::CodeFence { language, code }
}

/// Collect inline nodes until a matching End tag.
fn collect_inlines(
    events: &[Spanned<'_>],
    i: &mut usize,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<Inline> {
    let mut inlines = Vec::new();

    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            _ => {
                if !push_inline(events, i, &mut inlines) {
                    *i += 1;
                }
            }
        }
    }

    inlines
}

/// Consume one inline event (or one nested inline element) into `out`.
/// Returns false, without advancing, when the event is not inline-level.
fn push_inline(events: &[Spanned<'_>], i: &mut usize, out: &mut Vec<Inline>) -> bool {
    let (ref ev, _) = events[*i];
    match ev {
        Event::Text(s) | Event::InlineHtml(s) | Event::Html(s) => {
            push_text(out, s);
            *i += 1;
        }
        Event::FootnoteReference(s) => {
            push_text(out, &format!("[^{}]", s));
            *i += 1;
        }
        Event::TaskListMarker(checked) => {
            push_text(out, if *checked { "[x] " } else { "[ ] " });
            *i += 1;
        }
        Event::Code(s) | Event::InlineMath(s) | Event::DisplayMath(s) => {
            out.push(Inline::Code(s.to_string()));
            *i += 1;
        }
        Event::SoftBreak => {
            out.push(Inline::SoftBreak);
            *i += 1;
        }
        Event::HardBreak => {
            out.push(Inline::HardBreak);
            *i += 1;
        }
        Event::Start(Tag::Strong) => {
            *i += 1;
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strong));
            out.push(Inline::Strong(children));
        }
        Event::Start(Tag::Emphasis) => {
            *i += 1;
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Emphasis));
            out.push(Inline::Emphasis(children));
        }
        Event::Start(Tag::Strikethrough) => {
            *i += 1;
            let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strikethrough));
            out.push(Inline::Strikethrough(children));
        }
        Event::Start(Tag::Link { dest_url, title, .. }) => {
            let dest = dest_url.to_string();
            let title = title.to_string();
            *i += 1;
            let content = collect_inlines(events, i, &|e| matches!(e, TagEnd::Link));
            out.push(Inline::Link { dest, title, content });
        }
        Event::Start(Tag::Image { dest_url, title, .. }) => {
            let dest = dest_url.to_string();
            let title = title.to_string();
            *i += 1;
            let alt = collect_inlines(events, i, &|e| matches!(e, TagEnd::Image));
            out.push(Inline::Image { dest, title, alt });
        }
        _ => return false,
    }
    true
}

/// pulldown-cmark splits text at markup candidates; merge adjacent runs.
fn push_text(out: &mut Vec<Inline>, s: &str) {
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(s);
    } else {
        out.push(Inline::Text(s.to_string()));
    }
}
