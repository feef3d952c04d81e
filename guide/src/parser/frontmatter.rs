use serde::Deserialize;

use crate::parser::error::ParseError;

/// Optional TOML header of a guide source file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontMatter {
    /// Overrides the title taken from the first level-1 heading.
    #[serde(default)]
    pub title: Option<String>,

    /// One-line description shown in listings.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Split `source` into its front matter and Markdown body.
///
/// Returns the body and its byte offset within `source` so diagnostics from
/// the body can be mapped back onto the file. A source that does not open
/// with `---` has no front matter.
pub(crate) fn split(
    source: &str,
    file_id: usize,
) -> Result<(FrontMatter, &str, usize), ParseError> {
    let bom = if source.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
    let content = &source[bom..];

    let Some(after_open) = content.strip_prefix("---") else {
        return Ok((FrontMatter::default(), content, bom));
    };
    // A `---` line followed by more dashes or text is a rule, not front matter.
    let after_open = match after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
    {
        Some(rest) => rest,
        None => return Ok((FrontMatter::default(), content, bom)),
    };
    let header_start = source.len() - after_open.len();

    let Some(close_pos) = find_closing_delimiter(after_open) else {
        return Err(ParseError::error(
            "front matter is not closed",
            bom..header_start,
            file_id,
        )
        .with_note("end the front matter with a line containing only `---`"));
    };

    let toml_str = &after_open[..close_pos];
    let rest = &after_open[close_pos..];
    let rest = rest.strip_prefix("---").unwrap_or(rest);
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    let body_offset = source.len() - body.len();

    let front: FrontMatter = toml::from_str(toml_str).map_err(|e| {
        let span = e
            .span()
            .map(|s| (header_start + s.start)..(header_start + s.end))
            .unwrap_or(header_start..header_start + toml_str.len());
        ParseError::error(format!("invalid front matter: {}", e.message()), span, file_id)
    })?;

    Ok((front, body, body_offset))
}

/// Byte offset of the `---` line that closes the front matter.
fn find_closing_delimiter(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}
