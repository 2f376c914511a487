//! Documentation comment extraction.
//!
//! Comments are found by looking backwards from a node's start offset in the
//! source text, so no comment table from the parser is needed. Parsing is
//! total: anything that is not a recognizable tag stays in the description.

use phf::{phf_set, Set as PhfSet};
use vellum_carton::CompactString;
use vellum_relief::{Annotation, AnnotationTag};

/// Tags whose first word after the type is a name.
static NAMED_TAGS: PhfSet<&'static str> = phf_set! {
    "param",
    "arg",
    "argument",
    "extends",
    "augments",
    "mixes",
    "appliesMixin",
    "fires",
    "event",
    "memberof",
    "namespace",
    "attr",
    "attribute",
    "property",
    "prop",
    "template",
};

/// Find the `/** ... */` block ending right before `offset`.
///
/// Only whitespace may sit between the comment and the offset.
pub fn leading_doc_comment(source: &str, offset: u32) -> Option<&str> {
    let before = source.get(..offset as usize)?.trim_end();
    let body = before.strip_suffix("*/")?;
    let start = body.rfind("/*")?;
    let comment = &before[start..];
    if !comment.starts_with("/**") || comment == "/**/" {
        return None;
    }
    Some(comment)
}

/// Parse the doc comment before `offset`, if there is one.
pub fn annotation_at(source: &str, offset: u32) -> Option<Annotation> {
    leading_doc_comment(source, offset).map(parse_annotation)
}

/// Parse comment text into a description and ordered tags.
pub fn parse_annotation(text: &str) -> Annotation {
    let body = strip_delimiters(text);

    let mut description = String::new();
    let mut blocks: Vec<String> = Vec::new();

    for line in body.lines() {
        let line = strip_line_marker(line);
        if line.trim_start().starts_with('@') {
            blocks.extend(split_inline_tags(line.trim()).map(str::to_string));
        } else if let Some(current) = blocks.last_mut() {
            current.push('\n');
            current.push_str(line);
        } else {
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(line);
        }
    }

    Annotation {
        description: CompactString::new(description.trim()),
        tags: blocks.iter().filter_map(|block| parse_tag(block)).collect(),
    }
}

fn strip_delimiters(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .unwrap_or(text);
    text.strip_suffix("*/").unwrap_or(text)
}

fn strip_line_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
}

/// Split `@private @type {string}` into one block per tag.
fn split_inline_tags(line: &str) -> impl Iterator<Item = &str> {
    let bytes = line.as_bytes();
    let mut starts = vec![0];
    for i in 1..bytes.len() {
        let next_is_alpha = bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic());
        if bytes[i] == b'@' && bytes[i - 1].is_ascii_whitespace() && next_is_alpha {
            starts.push(i);
        }
    }
    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([line.len()]).collect();
    starts
        .into_iter()
        .zip(ends)
        .map(move |(start, end)| line[start..end].trim())
}

fn parse_tag(block: &str) -> Option<AnnotationTag> {
    let rest = block.strip_prefix('@')?;
    let title_end = rest
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(rest.len());
    let title = &rest[..title_end];
    if title.is_empty() {
        return None;
    }
    let mut rest = rest[title_end..].trim_start();

    let mut tag = AnnotationTag::new(title);

    if rest.starts_with('{') {
        if let Some(close) = matching_brace(rest) {
            tag.type_ = non_empty(&rest[1..close]);
            rest = rest[close + 1..].trim_start();
        }
    }

    if NAMED_TAGS.contains(title) {
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let raw_name = &rest[..name_end];
        tag.name = non_empty(optional_name(raw_name));
        rest = rest[name_end..].trim_start();
        rest = rest.strip_prefix("- ").unwrap_or(rest);
    }

    tag.description = non_empty(rest);
    Some(tag)
}

/// `[name=default]` names an optional parameter.
fn optional_name(raw: &str) -> &str {
    match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        Some(inner) => inner.split('=').next().unwrap_or(inner),
        None => raw,
    }
}

fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn non_empty(text: &str) -> Option<CompactString> {
    let text = text.trim();
    (!text.is_empty()).then(|| CompactString::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_privacy_tag() {
        let annotation = parse_annotation("/** @public The x. */");
        assert_eq!(annotation.description, "");
        assert_eq!(annotation.tags.len(), 1);
        assert_eq!(annotation.tags[0].title, "public");
        assert_eq!(annotation.tags[0].description.as_deref(), Some("The x."));
        assert_eq!(annotation.description_text(), "The x.");
    }

    #[test]
    fn test_parse_block_comment() {
        let annotation = parse_annotation(
            r#"/**
             * Sums two numbers.
             *
             * Second paragraph.
             * @param {number} a The first.
             *   Continues here.
             * @param {{x: number}} [b=2] - The second.
             * @return {number}
             */"#,
        );
        assert_eq!(annotation.description, "Sums two numbers.\n\nSecond paragraph.");
        assert_eq!(annotation.tags.len(), 3);

        let a = &annotation.tags[0];
        assert_eq!(a.title, "param");
        assert_eq!(a.type_.as_deref(), Some("number"));
        assert_eq!(a.name.as_deref(), Some("a"));
        assert_eq!(a.description.as_deref(), Some("The first.\n  Continues here."));

        let b = &annotation.tags[1];
        assert_eq!(b.type_.as_deref(), Some("{x: number}"));
        assert_eq!(b.name.as_deref(), Some("b"));
        assert_eq!(b.description.as_deref(), Some("The second."));

        let ret = &annotation.tags[2];
        assert_eq!(ret.title, "return");
        assert_eq!(ret.type_.as_deref(), Some("number"));
        assert_eq!(ret.name, None);
    }

    #[test]
    fn test_parse_several_tags_on_one_line() {
        let annotation = parse_annotation("/** @private @type {string} mail me@example.com */");
        assert_eq!(annotation.tags.len(), 2);
        assert_eq!(annotation.tags[0].title, "private");
        assert_eq!(annotation.tags[1].title, "type");
        assert_eq!(annotation.tags[1].type_.as_deref(), Some("string"));
        assert_eq!(
            annotation.tags[1].description.as_deref(),
            Some("mail me@example.com")
        );
    }

    #[test]
    fn test_parse_malformed_keeps_text() {
        let annotation = parse_annotation("not a comment at all {");
        assert_eq!(annotation.description, "not a comment at all {");
        assert!(annotation.tags.is_empty());

        let annotation = parse_annotation("/** @type {string */");
        assert_eq!(annotation.tags.len(), 1);
        assert_eq!(annotation.tags[0].type_, None);
        assert_eq!(annotation.tags[0].description.as_deref(), Some("{string"));
    }

    #[test]
    fn test_leading_doc_comment() {
        let source = "/** Doc. */\n  class A {}\n/* plain */ class B {}\n/**/ class C {}";
        let a = source.find("class A").unwrap() as u32;
        let b = source.find("class B").unwrap() as u32;
        let c = source.find("class C").unwrap() as u32;
        assert_eq!(leading_doc_comment(source, a), Some("/** Doc. */"));
        assert_eq!(leading_doc_comment(source, b), None);
        assert_eq!(leading_doc_comment(source, c), None);
        assert_eq!(leading_doc_comment(source, 0), None);
    }

    #[test]
    fn test_comment_must_be_adjacent() {
        let source = "/** Doc. */ foo(); class A {}";
        let a = source.find("class A").unwrap() as u32;
        assert_eq!(leading_doc_comment(source, a), None);
    }
}
