use std::collections::HashSet;

use guide::block::{Block, Inline, plain_text};
use guide::Document;
use pulldown_cmark_escape::{escape_href, escape_html};

use crate::render::Renderer;

/// HTML output: an `<article>` fragment, or a complete page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    /// Wrap the article in a full HTML page with a `<title>`.
    pub standalone: bool,
    /// When set, standalone pages link back to this index URL.
    pub index_href: Option<String>,
}

impl Renderer for HtmlRenderer {
    fn render(&self, document: &Document) -> String {
        let article = render_article(document);
        if !self.standalone {
            return article;
        }

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>");
        escape(&mut out, &document.title);
        out.push_str("</title>\n</head>\n<body>\n");
        if let Some(href) = &self.index_href {
            out.push_str("<nav><a href=\"");
            escape_attr_href(&mut out, href);
            out.push_str("\">All guides</a></nav>\n");
        }
        out.push_str(&article);
        out.push_str("</body>\n</html>\n");
        out
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

/// Render the document body as an `<article>`, one block per line.
pub fn render_article(document: &Document) -> String {
    let mut out = String::new();
    out.push_str("<article class=\"guide\" id=\"guide-");
    escape(&mut out, &document.name);
    out.push_str("\">\n");

    let mut lists = ListStack::default();
    let mut slugs = Slugger::default();

    for block in &document.body {
        if let Block::ListItem {
            depth,
            ordinal,
            content,
        } = block
        {
            lists.open_item(&mut out, *depth, *ordinal);
            push_inlines(&mut out, content);
            continue;
        }
        lists.close_all(&mut out);

        match block {
            Block::Heading { level, content } => {
                let id = slugs.slug(&plain_text(content));
                out.push_str(&format!("<h{} id=\"", level));
                escape(&mut out, &id);
                out.push_str("\">");
                push_inlines(&mut out, content);
                out.push_str(&format!("</h{}>\n", level));
            }
            Block::Paragraph(content) => {
                out.push_str("<p>");
                push_inlines(&mut out, content);
                out.push_str("</p>\n");
            }
            Block::CodeFence { language, code } => {
                out.push_str("<pre><code");
                if let Some(lang) = language {
                    out.push_str(" class=\"language-");
                    escape(&mut out, lang);
                    out.push('"');
                }
                out.push('>');
                escape(&mut out, code);
                out.push_str("</code></pre>\n");
            }
            Block::Rule => out.push_str("<hr>\n"),
            Block::Unrecognized { source, .. } => {
                out.push_str("<p class=\"literal\">");
                escape(&mut out, source);
                out.push_str("</p>\n");
            }
            Block::ListItem { .. } => {}
        }
    }
    lists.close_all(&mut out);

    out.push_str("</article>\n");
    out
}

/// Escape `text` as HTML body or attribute text.
pub(crate) fn escape(out: &mut String, text: &str) {
    escape_html(&mut *out, text).expect("writing to a String cannot fail");
}

/// An href inside a double-quoted attribute.
fn escape_attr_href(out: &mut String, href: &str) {
    escape_href(&mut *out, href).expect("writing to a String cannot fail");
}

/// Schemes that may appear in an emitted `href` or `src`.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Relative references are always allowed; absolute ones only with a
/// scheme from `SAFE_SCHEMES`.
fn is_safe_dest(dest: &str) -> bool {
    let dest = dest.trim_start();
    match dest.find([':', '/', '?', '#']) {
        Some(pos) if dest[pos..].starts_with(':') => {
            let scheme = &dest[..pos];
            SAFE_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s))
        }
        _ => true,
    }
}

fn push_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(s) => escape(out, s),
            Inline::Strong(children) => wrap(out, "strong", children),
            Inline::Emphasis(children) => wrap(out, "em", children),
            Inline::Strikethrough(children) => wrap(out, "del", children),
            Inline::Code(code) => {
                out.push_str("<code>");
                escape(out, code);
                out.push_str("</code>");
            }
            Inline::Link { dest, content, .. } if !is_safe_dest(dest) => {
                push_inlines(out, content);
            }
            Inline::Image { dest, alt, .. } if !is_safe_dest(dest) => {
                escape(out, &plain_text(alt));
            }
            Inline::Link {
                dest,
                title,
                content,
            } => {
                out.push_str("<a href=\"");
                escape_attr_href(out, dest);
                out.push('"');
                if !title.is_empty() {
                    out.push_str(" title=\"");
                    escape(out, title);
                    out.push('"');
                }
                out.push('>');
                push_inlines(out, content);
                out.push_str("</a>");
            }
            Inline::Image { dest, title, alt } => {
                out.push_str("<img src=\"");
                escape_attr_href(out, dest);
                out.push_str("\" alt=\"");
                escape(out, &plain_text(alt));
                out.push('"');
                if !title.is_empty() {
                    out.push_str(" title=\"");
                    escape(out, title);
                    out.push('"');
                }
                out.push('>');
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br>\n"),
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline]) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_inlines(out, children);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Rebuilds nested `<ul>`/`<ol>` elements from flattened list items.
/// Every list on the stack has an open `<li>` once its first item is written.
#[derive(Default)]
struct ListStack {
    open: Vec<OpenList>,
}

struct OpenList {
    depth: usize,
    ordered: bool,
}

impl ListStack {
    fn open_item(&mut self, out: &mut String, depth: usize, ordinal: Option<u64>) {
        let ordered = ordinal.is_some();

        while let Some(top) = self.open.last() {
            if top.depth > depth || (top.depth == depth && top.ordered != ordered) {
                self.close_top(out);
            } else {
                break;
            }
        }

        match self.open.last() {
            Some(top) if top.depth == depth => out.push_str("</li>\n"),
            _ => {
                match ordinal {
                    Some(1) => out.push_str("<ol>\n"),
                    Some(n) => out.push_str(&format!("<ol start=\"{}\">\n", n)),
                    None => out.push_str("<ul>\n"),
                }
                self.open.push(OpenList { depth, ordered });
            }
        }
        out.push_str("<li>");
    }

    fn close_top(&mut self, out: &mut String) {
        if let Some(list) = self.open.pop() {
            out.push_str(if list.ordered { "</li>\n</ol>\n" } else { "</li>\n</ul>\n" });
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.close_top(out);
        }
    }
}

/// Heading ids, unique within one document.
#[derive(Default)]
struct Slugger {
    seen: HashSet<String>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let mut base = String::new();
        for ch in text.chars().flat_map(char::to_lowercase) {
            if ch.is_alphanumeric() {
                base.push(ch);
            } else if !base.is_empty() && !base.ends_with('-') {
                base.push('-');
            }
        }
        while base.ends_with('-') {
            base.pop();
        }
        if base.is_empty() {
            base.push_str("section");
        }

        let mut slug = base.clone();
        let mut n = 1;
        while self.seen.contains(&slug) {
            slug = format!("{}-{}", base, n);
            n += 1;
        }
        self.seen.insert(slug.clone());
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::{Slugger, is_safe_dest};

    #[test]
    fn slugs_are_lowercase_and_unique() {
        let mut slugs = Slugger::default();
        assert_eq!(slugs.slug("Use const liberally"), "use-const-liberally");
        assert_eq!(slugs.slug("  C99: the basics! "), "c99-the-basics");
        assert_eq!(slugs.slug("Macros"), "macros");
        assert_eq!(slugs.slug("Macros"), "macros-1");
        assert_eq!(slugs.slug("???"), "section");
    }

    #[test]
    fn generated_slugs_do_not_collide_with_later_headings() {
        let mut slugs = Slugger::default();
        assert_eq!(slugs.slug("Macros"), "macros");
        assert_eq!(slugs.slug("Macros"), "macros-1");
        assert_eq!(slugs.slug("Macros 1"), "macros-1-1");
        assert_eq!(slugs.slug("Macros"), "macros-2");
    }

    #[test]
    fn only_known_schemes_are_linked() {
        assert!(is_safe_dest("https://example.com/x"));
        assert!(is_safe_dest("MAILTO:someone@example.com"));
        assert!(is_safe_dest("#section"));
        assert!(is_safe_dest("/docs/style"));
        assert!(is_safe_dest("style.html?a=b:c"));
        assert!(!is_safe_dest("javascript:alert(1)"));
        assert!(!is_safe_dest(" JavaScript:alert(1)"));
        assert!(!is_safe_dest("java\tscript:alert(1)"));
        assert!(!is_safe_dest("data:text/html,x"));
    }
}
