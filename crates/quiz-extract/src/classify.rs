use std::fmt;

use crate::syntax::{LineKind, Syntax};

pub const CHOICE_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// One lettered checkbox option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub letter: char,
    pub text: String,
    pub checked: bool,
}

/// Layout of a block's answer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionShape {
    /// Exactly `A` (correct) and `B` (incorrect).
    TrueFalse,
    /// Exactly `A`, `B`, `C` and `D`.
    StandardChoice,
    NonStandard { reason: String },
}

impl OptionShape {
    /// Number of selectable options; zero disables selection.
    pub fn option_count(&self) -> usize {
        match self {
            OptionShape::TrueFalse => 2,
            OptionShape::StandardChoice => 4,
            OptionShape::NonStandard { .. } => 0,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            OptionShape::NonStandard { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, OptionShape::NonStandard { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionShape::TrueFalse => "true-false",
            OptionShape::StandardChoice => "choice",
            OptionShape::NonStandard { .. } => "non-standard",
        }
    }
}

impl fmt::Display for OptionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionShape::NonStandard { reason } => write!(f, "non-standard ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Words that identify a true/false pair.
///
/// Option `A` must contain `correct` and option `B` must contain `incorrect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueFalseMarkers {
    pub correct: String,
    pub incorrect: String,
}

impl Default for TrueFalseMarkers {
    fn default() -> Self {
        Self {
            correct: "正确".to_string(),
            incorrect: "错误".to_string(),
        }
    }
}

/// Collects lettered checkbox options from a quoted view.
///
/// Both bare (`- [ ] A. x`) and still-quoted (`> - [ ] A. x`) lines count.
/// Identical letter/text pairs are reported once, in first-seen order.
pub fn extract_options(quoted_view: &str, syntax: &Syntax) -> Vec<ChoiceOption> {
    let mut options: Vec<ChoiceOption> = Vec::new();

    for line in quoted_view.lines() {
        let LineKind::Item(item) = syntax.classify_line(line) else {
            continue;
        };

        let duplicate = options
            .iter()
            .any(|existing| existing.letter == item.letter && existing.text == item.text);
        if duplicate {
            continue;
        }

        options.push(ChoiceOption {
            letter: item.letter,
            text: item.text.to_string(),
            checked: item.checkbox.is_checked(),
        });
    }

    options
}

pub fn classify(options: &[ChoiceOption], markers: &TrueFalseMarkers) -> OptionShape {
    let shape = match options.len() {
        2 => classify_pair(options, markers),
        4 => classify_choice(options),
        count => OptionShape::NonStandard {
            reason: format!(
                "found {count} options; expected 2 (true/false A/B) or 4 (choice A-D)"
            ),
        },
    };

    log::debug!(
        "classified {} options [{}] as {}",
        options.len(),
        letter_list(options.iter().map(|option| option.letter)),
        shape
    );
    shape
}

/// Classifies a quoted view directly.
pub fn classify_view(quoted_view: &str, syntax: &Syntax, markers: &TrueFalseMarkers) -> OptionShape {
    classify(&extract_options(quoted_view, syntax), markers)
}

fn classify_pair(options: &[ChoiceOption], markers: &TrueFalseMarkers) -> OptionShape {
    let find = |letter: char| options.iter().find(|option| option.letter == letter);

    let is_true_false = match (find('A'), find('B')) {
        (Some(a), Some(b)) => {
            a.text.contains(markers.correct.as_str()) && b.text.contains(markers.incorrect.as_str())
        }
        _ => false,
    };

    if is_true_false {
        OptionShape::TrueFalse
    } else {
        OptionShape::NonStandard {
            reason: format!(
                "2 options but not a true/false pair (expected A containing '{}' and B containing '{}')",
                markers.correct, markers.incorrect
            ),
        }
    }
}

fn classify_choice(options: &[ChoiceOption]) -> OptionShape {
    let invalid: Vec<char> = options
        .iter()
        .map(|option| option.letter)
        .filter(|letter| !CHOICE_LETTERS.contains(letter))
        .collect();
    if !invalid.is_empty() {
        return OptionShape::NonStandard {
            reason: format!("invalid option letters: {}", letter_list(invalid)),
        };
    }

    let mut letters: Vec<char> = options.iter().map(|option| option.letter).collect();
    letters.sort_unstable();
    if letters == CHOICE_LETTERS {
        return OptionShape::StandardChoice;
    }

    let duplicated: Vec<char> = CHOICE_LETTERS
        .iter()
        .copied()
        .filter(|letter| letters.iter().filter(|l| *l == letter).count() > 1)
        .collect();
    let missing: Vec<char> = CHOICE_LETTERS
        .iter()
        .copied()
        .filter(|letter| !letters.contains(letter))
        .collect();

    OptionShape::NonStandard {
        reason: format!(
            "option letters must be exactly A, B, C, D; found {} (duplicated: {}; missing: {})",
            letter_list(options.iter().map(|option| option.letter)),
            letter_list(duplicated),
            letter_list(missing)
        ),
    }
}

fn letter_list(letters: impl IntoIterator<Item = char>) -> String {
    letters
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(quoted: &str) -> OptionShape {
        classify_view(quoted, &Syntax::default(), &TrueFalseMarkers::default())
    }

    #[test]
    fn detects_true_false() {
        assert_eq!(
            shape("## Q1\n- [ ] A. 正确\n- [ ] B. 错误"),
            OptionShape::TrueFalse
        );
    }

    #[test]
    fn true_false_order_does_not_matter() {
        assert_eq!(
            shape("- [ ] B. 错误\n- [x] A. 正确"),
            OptionShape::TrueFalse
        );
    }

    #[test]
    fn other_pairs_are_non_standard() {
        let result = shape("- [ ] A. yes\n- [ ] B. no");
        assert!(result.reason().unwrap().contains("true/false"));
        assert_eq!(result.option_count(), 0);
    }

    #[test]
    fn detects_standard_choice_with_quoted_lines() {
        let quoted = "- [ ] A. one\n> - [ ] B. two\n- [x] C、three\n- [ ] D) four";
        assert_eq!(shape(quoted), OptionShape::StandardChoice);
    }

    #[test]
    fn duplicated_letter_is_reported() {
        let result = shape("- [ ] A. one\n- [ ] B. two\n- [ ] C. three\n- [ ] C. again");
        let reason = result.reason().unwrap();
        assert!(reason.contains("duplicated: C"), "{reason}");
        assert!(reason.contains("missing: D"), "{reason}");
    }

    #[test]
    fn identical_options_are_merged() {
        let options = extract_options(
            "- [ ] A. one\n- [ ] A. one\n- [ ] B. two",
            &Syntax::default(),
        );
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn invalid_letters_are_reported() {
        let result = shape("- [ ] A. one\n- [ ] B. two\n- [ ] C. three\n- [ ] E. five");
        assert_eq!(
            result.reason(),
            Some("invalid option letters: E")
        );
    }

    #[test]
    fn wrong_count_cites_count() {
        assert!(shape("").reason().unwrap().starts_with("found 0 options"));
        assert!(shape("- [ ] A. a\n- [ ] B. b\n- [ ] C. c")
            .reason()
            .unwrap()
            .starts_with("found 3 options"));
    }

    #[test]
    fn classification_is_deterministic() {
        let quoted = "- [ ] A. one\n- [ ] C. three\n- [ ] B. two\n- [ ] B. dup";
        assert_eq!(shape(quoted), shape(quoted));
    }
}
