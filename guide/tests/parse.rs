use guide::block::{Block, Inline, UnrecognizedKind};
use guide::parser::{Parsed, Parser};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Parsed {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect("parse failed")
}

fn text(s: &str) -> Inline {
    Inline::Text(s.to_string())
}

#[test]
fn title_comes_from_first_level_one_heading() {
    let parsed = parse("intro\n\n## Not this\n\n# C *Style*\n\n# Later\n");
    assert_eq!(parsed.title, "C Style");
}

#[test]
fn front_matter_title_wins() {
    let parsed = parse("---\ntitle = \"Override\"\nsummary = \"short\"\n---\n# Heading\n");
    assert_eq!(parsed.title, "Override");
    assert_eq!(parsed.summary.as_deref(), Some("short"));
    assert_eq!(parsed.blocks.len(), 1);
}

#[test]
fn missing_title_is_an_error() {
    let errors = Parser::new("## Only a subheading\n\ntext\n".to_string(), 7)
        .parse()
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_error());
    assert_eq!(errors[0].file_id, 7);
    assert!(errors[0].message.contains("no title"));
}

#[test]
fn blocks_follow_source_order() {
    let src = "# T\n\npara\n\n```c\nint x;\n```\n\n- item\n\n---\n";
    let kinds: Vec<&str> = parse(src).blocks.iter().map(|b| b.kind_name()).collect();
    assert_eq!(kinds, vec!["heading", "paragraph", "code", "list-item", "rule"]);
}

#[test]
fn inline_markup_is_structured() {
    let parsed = parse("# T\n\nUse **bold**, *em*, ~~old~~, `code` and [a link](https://x.org \"t\").\n");
    assert_eq!(
        parsed.blocks[1],
        Block::Paragraph(vec![
            text("Use "),
            Inline::Strong(vec![text("bold")]),
            text(", "),
            Inline::Emphasis(vec![text("em")]),
            text(", "),
            Inline::Strikethrough(vec![text("old")]),
            text(", "),
            Inline::Code("code".into()),
            text(" and "),
            Inline::Link {
                dest: "https://x.org".into(),
                title: "t".into(),
                content: vec![text("a link")],
            },
            text("."),
        ])
    );
}

#[test]
fn code_fence_keeps_language_and_text_verbatim() {
    let parsed = parse("# T\n\n```c linenos\nint main(void) { return 0; }\n```\n\n    indented\n");
    assert_eq!(
        parsed.blocks[1],
        Block::CodeFence {
            language: Some("c".into()),
            code: "int main(void) { return 0; }\n".into(),
        }
    );
    assert_eq!(
        parsed.blocks[2],
        Block::CodeFence {
            language: None,
            code: "indented\n".into(),
        }
    );
}

#[test]
fn lists_are_flattened_with_depth_and_ordinal() {
    let src = "# T\n\n3. three\n4. four\n   - nested\n   - more\n5. five\n";
    let items: Vec<(usize, Option<u64>, String)> = parse(src)
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::ListItem { depth, ordinal, .. } => Some((*depth, *ordinal, b.plain_text())),
            _ => None,
        })
        .collect();
    assert_eq!(
        items,
        vec![
            (0, Some(3), "three".to_string()),
            (0, Some(4), "four".to_string()),
            (1, None, "nested".to_string()),
            (1, None, "more".to_string()),
            (0, Some(5), "five".to_string()),
        ]
    );
}

#[test]
fn loose_list_item_paragraphs_are_joined() {
    let parsed = parse("# T\n\n- first\n\n  second\n\n- next\n");
    assert_eq!(
        parsed.blocks[1],
        Block::ListItem {
            depth: 0,
            ordinal: None,
            content: vec![text("first"), Inline::HardBreak, text("second")],
        }
    );
}

#[test]
fn code_inside_list_item_follows_the_item() {
    let parsed = parse("# T\n\n1. step\n\n   ```c\n   x++;\n   ```\n2. done\n");
    let kinds: Vec<&str> = parsed.blocks.iter().map(|b| b.kind_name()).collect();
    assert_eq!(kinds, vec!["heading", "list-item", "code", "list-item"]);
}

#[test]
fn unsupported_constructs_become_unrecognized_with_warning() {
    let src = "# T\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n> quoted\n\nafter\n";
    let parsed = parse(src);
    assert_eq!(
        parsed.blocks[1],
        Block::Unrecognized {
            kind: UnrecognizedKind::Table,
            source: "| a | b |\n|---|---|\n| 1 | 2 |".into(),
        }
    );
    assert!(matches!(
        parsed.blocks[2],
        Block::Unrecognized { kind: UnrecognizedKind::BlockQuote, .. }
    ));
    assert_eq!(parsed.blocks[3], Block::Paragraph(vec![text("after")]));
    assert_eq!(parsed.warnings.len(), 2);
    assert!(parsed.warnings.iter().all(|w| !w.is_error()));
    assert_eq!(&src[parsed.warnings[0].span.clone()].trim_end(), &"| a | b |\n|---|---|\n| 1 | 2 |");
}

#[test]
fn skipped_heading_level_warns_with_span_after_front_matter() {
    let src = "---\nsummary = \"s\"\n---\n# T\n\n### Deep\n";
    let parsed = parse(src);
    assert_eq!(parsed.warnings.len(), 1);
    let span = parsed.warnings[0].span.clone();
    assert!(src[span].starts_with("### Deep"));
}

#[test]
fn display_round_trips_to_equivalent_blocks() {
    let src = "# Title\n\nSome *text* with `code`.\n\n```c\nint x;\n```\n\n- a\n    - b\n1. one\n\n---\n";
    let first = parse(src);
    let document = guide::Document {
        name: "x".into(),
        title: first.title.clone(),
        summary: None,
        body: first.blocks.clone(),
        source_id: 0,
    };
    let second = parse(&document.to_string());
    assert_eq!(second.blocks, first.blocks);
}

#[test]
fn display_keeps_escaped_punctuation_literal() {
    let src = "# Title\n\n\
               literal \\*stars\\* and \\_under\\_, \\<tag\\> \\[x\\] \\# \\& \\`tick\\`\n\n\
               \\- not a list\n\n\
               2\\. not ordered\n\n\
               [link](<a b> \"t\")\n";
    let first = parse(src);
    assert_eq!(
        first.blocks[1],
        Block::Paragraph(vec![text("literal *stars* and _under_, <tag> [x] # & `tick`")])
    );
    assert_eq!(first.blocks[2], Block::Paragraph(vec![text("- not a list")]));
    assert_eq!(first.blocks[3], Block::Paragraph(vec![text("2. not ordered")]));

    let document = guide::Document {
        name: "x".into(),
        title: first.title.clone(),
        summary: None,
        body: first.blocks.clone(),
        source_id: 0,
    };
    let second = parse(&document.to_string());
    assert_eq!(second.blocks, first.blocks);
}
