//! Option selection on a single block.

use quiz_config::PolicySetting;
use quiz_extract::{LineKind, QuestionBlock, Syntax};

use crate::error::SelectError;
use crate::EditOptions;
use crate::strip::strip_answers;

/// How a selection event treats letters that are already chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// One letter at a time; selecting the chosen letter again is a no-op.
    #[default]
    Single,
    /// Each event toggles one letter.
    Multi,
}

impl From<PolicySetting> for SelectionPolicy {
    fn from(setting: PolicySetting) -> Self {
        match setting {
            PolicySetting::Single => SelectionPolicy::Single,
            PolicySetting::Multi => SelectionPolicy::Multi,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub block: QuestionBlock,
    pub changed: bool,
}

/// Maps an input key to an option letter.
///
/// `1`-`4` stand for `A`-`D`; letters are accepted in either case.
pub fn letter_for_key(key: &str) -> Result<char, SelectError> {
    let trimmed = key.trim();
    let mut chars = trimmed.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Err(SelectError::InvalidKey(key.to_string()));
    };

    match ch {
        '1'..='4' => Ok((b'A' + (ch as u8 - b'1')) as char),
        _ if ch.is_ascii_alphabetic() => Ok(ch.to_ascii_uppercase()),
        _ => Err(SelectError::InvalidKey(key.to_string())),
    }
}

/// Applies one selection event to `block`.
///
/// Rejected events leave the block untouched. Every event that changes the
/// selection also strips answer and analysis segments from the text.
pub fn select(
    block: &QuestionBlock,
    letter: char,
    policy: SelectionPolicy,
    options: &EditOptions,
) -> Result<Selection, SelectError> {
    let letter = letter.to_ascii_uppercase();
    let count = block.option_count();
    if count == 0 {
        return Err(SelectError::NonStandard {
            index: block.index(),
            reason: block.shape().reason().unwrap_or_default().to_string(),
        });
    }
    let position = (letter as u32).wrapping_sub('A' as u32) as usize;
    if !letter.is_ascii_uppercase() || position >= count {
        return Err(SelectError::OutOfRange {
            index: block.index(),
            letter,
            count,
        });
    }

    let syntax = &options.extract.syntax;
    let mut selected = block.selected_letters().to_vec();
    let text = match policy {
        SelectionPolicy::Single => {
            if block.is_selected(letter) {
                log::debug!("block {}: {letter} already selected", block.index());
                return Ok(Selection {
                    block: block.clone(),
                    changed: false,
                });
            }
            let mut text = block.raw_text().to_string();
            for option in block.options() {
                if option.letter != letter && (option.checked || selected.contains(&option.letter)) {
                    text = set_checkbox(&text, syntax, option.letter, false);
                }
            }
            selected = vec![letter];
            set_checkbox(&text, syntax, letter, true)
        }
        SelectionPolicy::Multi => {
            let was_selected = block.is_selected(letter);
            if was_selected {
                selected.retain(|existing| *existing != letter);
            } else {
                selected.push(letter);
            }
            set_checkbox(block.raw_text(), syntax, letter, !was_selected)
        }
    };

    let text = strip_answers(&text, &options.strip, syntax);
    let updated = block.rebuild(text, selected, &options.extract);
    log::debug!(
        "block {}: selected [{}]",
        updated.index(),
        updated.selected_letters().iter().collect::<String>()
    );

    Ok(Selection {
        block: updated,
        changed: true,
    })
}

/// Sets the checkbox of `letter` to `checked`.
///
/// Only the first quoted item and the first unquoted item carrying the
/// letter are touched; every other line is copied verbatim.
pub fn set_checkbox(text: &str, syntax: &Syntax, letter: char, checked: bool) -> String {
    let state = if checked { 'x' } else { ' ' };
    let mut seen_quoted = false;
    let mut seen_unquoted = false;

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let LineKind::Item(item) = syntax.classify_line(line) else {
                return line.to_string();
            };
            if item.letter != letter {
                return line.to_string();
            }

            let seen = if item.checkbox.quoted {
                &mut seen_quoted
            } else {
                &mut seen_unquoted
            };
            if *seen {
                return line.to_string();
            }
            *seen = true;

            let offset = item.checkbox.state_offset;
            let width = item.checkbox.state.len_utf8();
            format!("{}{state}{}", &line[..offset], &line[offset + width..])
        })
        .collect();

    lines.join("\n")
}
