use once_cell::sync::Lazy;
use quiz_extract::{ExtractOptions, QuestionBlock, Syntax};
use regex::Regex;

/// Four lettered options run together in one checkbox body, e.g.
/// `A.map B.filter C.collect D.sum`.
static ONE_LINE_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^A(?:[.．、)]|\s)\s*(?P<a>\S.*?)(?:\s*B[.．、)]|\s+B\s)\s*(?P<b>\S.*?)(?:\s*C[.．、)]|\s+C\s)\s*(?P<c>\S.*?)(?:\s*D[.．、)]|\s+D\s)\s*(?P<d>\S.*)$",
    )
    .unwrap_or_else(|err| unreachable!("one-line option pattern is valid: {err}"))
});

#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub block: QuestionBlock,
    pub changed: bool,
}

/// Splits every one-line four-option checkbox into four option lines.
///
/// Each new line keeps the original indentation, quote marker and checkbox
/// state. Returns the new text and whether anything changed.
pub fn repair_text(text: &str, syntax: &Syntax) -> (String, bool) {
    let mut lines: Vec<String> = Vec::new();
    let mut changed = false;

    for line in text.split('\n') {
        let Some(checkbox) = syntax.parse_checkbox(line) else {
            lines.push(line.to_string());
            continue;
        };
        let Some(captures) = ONE_LINE_OPTIONS.captures(checkbox.body) else {
            lines.push(line.to_string());
            continue;
        };

        for (letter, group) in [('A', "a"), ('B', "b"), ('C', "c"), ('D', "d")] {
            let option = captures.name(group).map(|m| m.as_str().trim()).unwrap_or("");
            lines.push(format!(
                "{}- [{}] {letter}. {option}",
                checkbox.prefix, checkbox.state
            ));
        }
        log::debug!("split one-line options: {}", checkbox.body);
        changed = true;
    }

    if changed {
        (lines.join("\n"), true)
    } else {
        (text.to_string(), false)
    }
}

/// Repairs one block, returning a re-derived block when the text changed.
///
/// A block that only becomes selectable through the repair takes its
/// selection from the checkboxes ticked in the repaired text.
pub fn repair(block: &QuestionBlock, options: &ExtractOptions) -> RepairOutcome {
    let (text, changed) = repair_text(block.raw_text(), &options.syntax);
    if !changed {
        return RepairOutcome {
            block: block.clone(),
            changed: false,
        };
    }

    let mut repaired = block.rebuild(text, block.selected_letters().to_vec(), options);
    if !block.shape().is_standard() && repaired.shape().is_standard() {
        let seeded = repaired.checked_letters();
        repaired = repaired.rebuild(repaired.raw_text().to_string(), seeded, options);
    }
    log::debug!(
        "block {}: repaired, now {}",
        repaired.index(),
        repaired.shape()
    );
    RepairOutcome {
        block: repaired,
        changed: true,
    }
}

/// Repairs every block in place and returns how many changed.
pub fn repair_all(blocks: &mut [QuestionBlock], options: &ExtractOptions) -> usize {
    let mut count = 0;
    for block in blocks.iter_mut() {
        let outcome = repair(block, options);
        if outcome.changed {
            *block = outcome.block;
            count += 1;
        }
    }
    count
}
