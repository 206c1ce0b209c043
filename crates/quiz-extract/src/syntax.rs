//! Line grammar for question documents.
//!
//! Every line falls into one of a handful of kinds: blank, block separator,
//! question heading, checkbox list item, or anything else. Splitting,
//! partitioning, classification and the editing operations all work from
//! this tokenization rather than from free-form pattern matching.

/// Markers that shape a question document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    /// Literal line that separates two blocks.
    pub separator: String,
    /// Block-quote marker that introduces quoted (answer/reference) lines.
    pub quote_marker: char,
    /// Heading marker that follows the quote marker on a question heading.
    pub heading_marker: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            separator: "---".to_string(),
            quote_marker: '>',
            heading_marker: "##".to_string(),
        }
    }
}

impl Syntax {
    /// Splits one leading quote marker (and the whitespace around it) off `line`.
    ///
    /// Returns `None` when the line is not quoted.
    pub fn strip_quote<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.trim_start()
            .strip_prefix(self.quote_marker)
            .map(str::trim_start)
    }

    pub fn is_quoted(&self, line: &str) -> bool {
        self.strip_quote(line).is_some()
    }

    pub fn is_separator(&self, line: &str) -> bool {
        line.trim() == self.separator
    }

    pub fn is_heading(&self, line: &str) -> bool {
        self.strip_quote(line)
            .map(|rest| rest.starts_with(self.heading_marker.as_str()))
            .unwrap_or(false)
    }

    /// Classifies a single line.
    pub fn classify_line<'a>(&self, line: &'a str) -> LineKind<'a> {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }
        if self.is_separator(line) {
            return LineKind::Separator;
        }
        if self.is_heading(line) {
            return LineKind::Heading;
        }
        match self.parse_checkbox(line) {
            Some(checkbox) => match checkbox.item() {
                Some(item) => LineKind::Item(item),
                None => LineKind::Checkbox(checkbox),
            },
            None => LineKind::Other,
        }
    }

    /// Parses `[ws][marker ws]- [S] body` where `S` is a space, `x` or `X`.
    pub fn parse_checkbox<'a>(&self, line: &'a str) -> Option<Checkbox<'a>> {
        let (quoted, rest) = match self.strip_quote(line) {
            Some(rest) => (true, rest),
            None => (false, line.trim_start()),
        };

        let dash_offset = line.len() - rest.len();
        let after_dash = rest.strip_prefix('-')?;
        let after_ws = after_dash.trim_start();
        let after_open = after_ws.strip_prefix('[')?;
        let state = after_open.chars().next()?;
        if !matches!(state, ' ' | 'x' | 'X') {
            return None;
        }
        let after_state = &after_open[state.len_utf8()..];
        let body = after_state.strip_prefix(']')?;

        let state_offset = line.len() - after_open.len();

        Some(Checkbox {
            prefix: &line[..dash_offset],
            quoted,
            state,
            state_offset,
            body: body.trim(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Separator,
    Heading,
    /// Checkbox item carrying an option letter.
    Item(ListItem<'a>),
    /// Checkbox item without a recognizable option letter.
    Checkbox(Checkbox<'a>),
    Other,
}

/// A `- [ ]` / `- [x]` list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox<'a> {
    /// Everything before the dash: indentation plus the quote marker context.
    pub prefix: &'a str,
    pub quoted: bool,
    /// The character between the brackets.
    pub state: char,
    /// Byte offset of `state` within the line.
    pub state_offset: usize,
    /// Text after the closing bracket, trimmed.
    pub body: &'a str,
}

impl<'a> Checkbox<'a> {
    pub fn is_checked(&self) -> bool {
        self.state != ' '
    }

    /// Reads an option letter from the start of the body.
    ///
    /// The letter is an ASCII capital, optionally followed by `.`, `．`, `、`
    /// or `)`. An ASCII letter or digit right after it means a word such as
    /// `Done`, which is not option `D`.
    pub fn item(&self) -> Option<ListItem<'a>> {
        let mut chars = self.body.chars();
        let letter = chars.next().filter(char::is_ascii_uppercase)?;
        let rest = chars.as_str();

        let text = match rest.chars().next() {
            None => "",
            Some(ch) if is_letter_punctuation(ch) => rest[ch.len_utf8()..].trim(),
            Some(ch) if ch.is_ascii_alphanumeric() => return None,
            Some(_) => rest.trim(),
        };

        Some(ListItem {
            checkbox: self.clone(),
            letter,
            text,
        })
    }
}

/// A checkbox item with an option letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub checkbox: Checkbox<'a>,
    pub letter: char,
    pub text: &'a str,
}

pub(crate) fn is_letter_punctuation(ch: char) -> bool {
    matches!(ch, '.' | '．' | '、' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_quoted_item() {
        let syntax = Syntax::default();
        let LineKind::Item(item) = syntax.classify_line("> - [x] B. 错误") else {
            panic!("expected item");
        };
        assert!(item.checkbox.quoted);
        assert!(item.checkbox.is_checked());
        assert_eq!(item.checkbox.prefix, "> ");
        assert_eq!(item.letter, 'B');
        assert_eq!(item.text, "错误");
    }

    #[test]
    fn tokenizes_bare_item_without_punctuation() {
        let syntax = Syntax::default();
        let LineKind::Item(item) = syntax.classify_line("  - [ ] C   third") else {
            panic!("expected item");
        };
        assert!(!item.checkbox.quoted);
        assert_eq!(item.checkbox.prefix, "  ");
        assert_eq!(item.checkbox.state_offset, 5);
        assert_eq!(item.text, "third");
    }

    #[test]
    fn tokenizes_letter_glued_to_text() {
        let syntax = Syntax::default();
        let LineKind::Item(item) = syntax.classify_line("> - [ ] A正确") else {
            panic!("expected item");
        };
        assert_eq!(item.letter, 'A');
        assert_eq!(item.text, "正确");
    }

    #[test]
    fn words_are_not_letters() {
        let syntax = Syntax::default();
        assert!(matches!(
            syntax.classify_line("- [ ] Done already"),
            LineKind::Checkbox(_)
        ));
        assert!(matches!(
            syntax.classify_line("- [ ] A1 grade"),
            LineKind::Checkbox(_)
        ));
    }

    #[test]
    fn recognizes_structure_lines() {
        let syntax = Syntax::default();
        assert_eq!(syntax.classify_line("  ---  "), LineKind::Separator);
        assert_eq!(syntax.classify_line("> ## Q1"), LineKind::Heading);
        assert_eq!(syntax.classify_line("## Q1"), LineKind::Other);
        assert_eq!(syntax.classify_line("   "), LineKind::Blank);
        assert_eq!(syntax.classify_line("> ---"), LineKind::Other);
    }
}
