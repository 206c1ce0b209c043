//! Removal of answer and analysis segments from block text.

use quiz_config::StripSettings;
use quiz_extract::Syntax;

/// Labels that open a segment to strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripRules {
    /// Matched case-insensitively, followed by `:` or `：`.
    pub answer_labels: Vec<String>,
    pub analysis_labels: Vec<String>,
    /// Matched verbatim at the start of the line content.
    pub malformed_answer_prefixes: Vec<String>,
}

impl Default for StripRules {
    fn default() -> Self {
        Self {
            answer_labels: to_strings(&["答案", "参考答案", "answer", "reference answer"]),
            analysis_labels: to_strings(&["解析", "analysis"]),
            malformed_answer_prefixes: to_strings(&["AI答案为"]),
        }
    }
}

impl From<&StripSettings> for StripRules {
    fn from(settings: &StripSettings) -> Self {
        Self {
            answer_labels: settings.answer_labels.clone(),
            analysis_labels: settings.analysis_labels.clone(),
            malformed_answer_prefixes: settings.malformed_answer_prefixes.clone(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl StripRules {
    /// Byte offset in `line` where an answer or analysis segment begins.
    fn segment_start(&self, line: &str, syntax: &Syntax) -> Option<usize> {
        let quoted = syntax.strip_quote(line);
        let content = quoted.unwrap_or_else(|| line.trim_start());
        let content_start = line.len() - content.len();

        let opens_line = self
            .malformed_answer_prefixes
            .iter()
            .any(|prefix| content.starts_with(prefix.as_str()))
            || (quoted.is_some() && is_lettered_answer(content));
        if opens_line {
            return Some(content_start);
        }

        let labels: Vec<&str> = self
            .answer_labels
            .iter()
            .chain(&self.analysis_labels)
            .map(String::as_str)
            .collect();
        let (at, _) = content
            .char_indices()
            .find(|&(at, _)| labels.iter().any(|label| label_at(content, at, label)))?;

        // A label glued to a preceding word (`正确答案`, `本题答案`) takes the line with it.
        let glued = content[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        Some(if glued { content_start } else { content_start + at })
    }
}

/// `label:` / `label：` at byte `at`, optionally wrapped in `**`.
///
/// ASCII labels must start a word, so `Data analysis:` matches but
/// `Reanalysis:` does not match `analysis`.
fn label_at(content: &str, at: usize, label: &str) -> bool {
    let Some(head) = content.get(at..at + label.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(label) {
        return false;
    }
    let ascii_word = label.chars().next().is_some_and(|ch| ch.is_ascii_alphanumeric());
    if ascii_word
        && content[..at]
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_ascii_alphanumeric())
    {
        return false;
    }

    let rest = &content[at + label.len()..];
    let rest = rest.strip_prefix("**").unwrap_or(rest).trim_start();
    rest.starts_with(':') || rest.starts_with('：')
}

/// Text of `line` before a segment starting at `at`, or `None` when only
/// markup remains.
fn kept_head<'a>(line: &'a str, at: usize, syntax: &Syntax) -> Option<&'a str> {
    let head = line[..at].trim_end().trim_end_matches('*').trim_end();
    (!is_blank(head, syntax)).then_some(head)
}

/// `A)` through `D)` at the start of a quoted line.
fn is_lettered_answer(content: &str) -> bool {
    let mut chars = content.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('A'..='D'), Some(')'))
    )
}

fn is_blank(line: &str, syntax: &Syntax) -> bool {
    syntax
        .strip_quote(line)
        .unwrap_or(line)
        .trim()
        .is_empty()
}

/// Removes answer and analysis segments from `text`.
///
/// A segment starts at an answer or analysis label (`答案：`, `**解析**:`)
/// anywhere on a line, or at a malformed answer prefix opening the line, and
/// runs to the next blank line or the end of the text. Text before the label
/// on the same line is kept. Option lines are never segment starts. Text
/// without segments is returned unchanged.
pub fn strip_answers(text: &str, rules: &StripRules, syntax: &Syntax) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = 0usize;
    let mut in_segment = false;

    for line in text.split('\n') {
        if in_segment {
            if is_blank(line, syntax) {
                in_segment = false;
                kept.push(line);
            } else {
                removed += 1;
            }
            continue;
        }

        let start = match syntax.parse_checkbox(line) {
            Some(_) => None,
            None => rules.segment_start(line, syntax),
        };
        if let Some(at) = start {
            in_segment = true;
            removed += 1;
            if let Some(head) = kept_head(line, at, syntax) {
                kept.push(head);
            }
            continue;
        }

        kept.push(line);
    }

    if removed == 0 {
        return text.to_string();
    }
    log::debug!("stripped {removed} answer/analysis line(s)");

    let mut output: Vec<&str> = Vec::with_capacity(kept.len());
    for line in kept {
        let blank = is_blank(line, syntax);
        let previous_blank = output.last().is_some_and(|prev| is_blank(prev, syntax));
        if blank && (previous_blank || output.is_empty()) {
            continue;
        }
        output.push(line);
    }
    while output.last().is_some_and(|line| is_blank(line, syntax)) {
        output.pop();
    }

    output.join("\n")
}
