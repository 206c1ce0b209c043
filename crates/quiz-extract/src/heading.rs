use pulldown_cmark::{Event, Options, Parser};

use crate::syntax::Syntax;

/// Heading line that opens a question, e.g. `> ## 1. What is ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionHeading {
    /// Number of heading marker characters (`##` → 2).
    pub depth: usize,
    /// Heading text with markers removed.
    pub raw: String,
    /// Plain-text rendering of `raw`.
    pub normalized: String,
}

pub fn detect_heading(syntax: &Syntax, line: &str) -> Option<QuestionHeading> {
    if !syntax.is_heading(line) {
        return None;
    }

    let rest = syntax.strip_quote(line)?;
    let depth = rest.chars().take_while(|ch| *ch == '#').count();
    let content = rest.trim_start_matches('#').trim();
    let content = strip_closing_hashes(content);

    let raw = content.to_string();
    // An ordinal such as `12.` would otherwise be read as an ordered list.
    let (ordinal, title) = split_ordinal(content);
    let normalized = match ordinal {
        Some(ordinal) => format!("{ordinal} {}", normalize_heading_text(title)),
        None => normalize_heading_text(title),
    };

    Some(QuestionHeading {
        depth,
        raw,
        normalized,
    })
}

fn split_ordinal(content: &str) -> (Option<&str>, &str) {
    let digits = content.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return (None, content);
    }
    let rest = &content[digits..];
    match rest.chars().next() {
        Some(ch @ ('.' | ')' | '、')) => {
            let end = digits + ch.len_utf8();
            (Some(&content[..end]), content[end..].trim_start())
        }
        _ => (None, content),
    }
}

fn strip_closing_hashes(content: &str) -> &str {
    let stripped = content.trim_end_matches('#');
    if stripped.len() < content.len() && stripped.ends_with(char::is_whitespace) {
        stripped.trim_end()
    } else {
        content
    }
}

pub fn normalize_heading_text(input: &str) -> String {
    let mut text_segments = Vec::new();
    let parser = Parser::new_ext(input, Options::empty());

    for event in parser {
        match event {
            Event::Text(cow) | Event::Code(cow) => text_segments.push(cow.to_string()),
            Event::SoftBreak | Event::HardBreak => text_segments.push(" ".to_string()),
            Event::FootnoteReference(name) => text_segments.push(name.to_string()),
            _ => {}
        }
    }

    let normalized = text_segments.join("");
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_heading() {
        let syntax = Syntax::default();
        let heading = detect_heading(&syntax, ">  ## 12. The **bold** question ##").unwrap();
        assert_eq!(heading.depth, 2);
        assert_eq!(heading.raw, "12. The **bold** question");
        assert_eq!(heading.normalized, "12. The bold question");
    }

    #[test]
    fn ignores_unquoted_heading() {
        let syntax = Syntax::default();
        assert!(detect_heading(&syntax, "## Q1").is_none());
    }

    #[test]
    fn keeps_inline_code() {
        let syntax = Syntax::default();
        let heading = detect_heading(&syntax, "> ### Use `Vec<T>` [here](url)").unwrap();
        assert_eq!(heading.depth, 3);
        assert_eq!(heading.normalized, "Use Vec<T> here");
    }
}
