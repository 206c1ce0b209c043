use std::path::{Path, PathBuf};

use quiz_config::{Config, SplitSetting};
use quiz_extract::{
    load_with_spans, BlockSpan, ExtractOptions, QuestionBlock, SplitStrategy, Syntax,
    TrueFalseMarkers,
};

use crate::error::{EditError, EditResult, SelectError, SessionError};
use crate::export::{export, ExportView};
use crate::fs::{autosave_path, read_document, write_atomic};
use crate::repair::{repair, repair_all};
use crate::select::{letter_for_key, select, SelectionPolicy};
use crate::strip::StripRules;
use crate::EditOptions;

/// Everything a session needs to interpret and edit a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub edit: EditOptions,
    pub policy: SelectionPolicy,
    pub export_view: ExportView,
    pub autosave: bool,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        let document = &config.document;
        let strategy = match document.split_strategy {
            SplitSetting::Auto => SplitStrategy::Auto,
            SplitSetting::Separator => SplitStrategy::Separator,
            SplitSetting::Heading => SplitStrategy::Heading,
        };

        Self {
            edit: EditOptions {
                extract: ExtractOptions {
                    syntax: Syntax {
                        separator: document.separator.clone(),
                        quote_marker: document.quote_marker,
                        heading_marker: document.heading_marker.clone(),
                    },
                    strategy,
                    markers: TrueFalseMarkers {
                        correct: config.classify.correct_marker.clone(),
                        incorrect: config.classify.incorrect_marker.clone(),
                    },
                },
                strip: StripRules::from(&config.strip),
            },
            policy: config.selection.policy.into(),
            export_view: config.export.view.into(),
            autosave: config.export.autosave,
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A loaded document, its blocks, and the block being worked on.
///
/// Loading replaces all state; every edit swaps in a re-derived block.
#[derive(Debug, Clone)]
pub struct Session {
    document: String,
    spans: Vec<BlockSpan>,
    blocks: Vec<QuestionBlock>,
    cursor: usize,
    options: SessionOptions,
}

impl Session {
    pub fn load(document: impl Into<String>, options: SessionOptions) -> Self {
        let document = document.into();
        let (spans, mut blocks): (Vec<_>, Vec<_>) =
            load_with_spans(&document, &options.edit.extract)
                .into_iter()
                .unzip();

        for block in blocks.iter_mut() {
            restrict_to_policy(block, &options);
        }

        Self {
            document,
            spans,
            blocks,
            cursor: 0,
            options,
        }
    }

    pub fn open(path: &Path, options: SessionOptions) -> EditResult<Self> {
        let document = read_document(path)?;
        Ok(Self::load(document, options))
    }

    /// The document as it was loaded.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn blocks(&self) -> &[QuestionBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn current(&self) -> Option<&QuestionBlock> {
        self.blocks.get(self.cursor)
    }

    /// 1-based index of the current block.
    pub fn position(&self) -> Option<usize> {
        self.current().map(QuestionBlock::index)
    }

    /// Moves to the next block, staying on the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&QuestionBlock> {
        if self.cursor + 1 < self.blocks.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Moves to the previous block, staying on the first one.
    pub fn prev(&mut self) -> Option<&QuestionBlock> {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Moves to the block numbered by `input` (1-based).
    pub fn jump(&mut self, input: &str) -> Result<&QuestionBlock, SessionError> {
        let index = self.check_index(input)?;
        self.cursor = index - 1;
        Ok(&self.blocks[self.cursor])
    }

    /// Parses and range-checks a 1-based block number without moving.
    pub fn check_index(&self, input: &str) -> Result<usize, SessionError> {
        if self.blocks.is_empty() {
            return Err(SessionError::Empty);
        }
        let trimmed = input.trim();
        let index: usize = trimmed
            .parse()
            .map_err(|_| SessionError::NotANumber(trimmed.to_string()))?;
        if index == 0 || index > self.blocks.len() {
            return Err(SessionError::OutOfRange {
                index,
                count: self.blocks.len(),
            });
        }
        Ok(index)
    }

    /// Option count of the current block: 2, 4, or 0 when nothing is selectable.
    pub fn option_count(&self) -> usize {
        self.current().map(QuestionBlock::option_count).unwrap_or(0)
    }

    pub fn repair_current(&mut self) -> Result<bool, SessionError> {
        let extract = &self.options.edit.extract;
        let block = self.blocks.get_mut(self.cursor).ok_or(SessionError::Empty)?;
        let outcome = repair(block, extract);
        if outcome.changed {
            *block = outcome.block;
            restrict_to_policy(block, &self.options);
        }
        Ok(outcome.changed)
    }

    pub fn repair_all(&mut self) -> usize {
        let count = repair_all(&mut self.blocks, &self.options.edit.extract);
        for block in self.blocks.iter_mut() {
            restrict_to_policy(block, &self.options);
        }
        log::info!("repaired {count} block(s)");
        count
    }

    /// Applies a selection key (`1`-`4` or a letter) to the current block.
    pub fn select_key(&mut self, key: &str) -> Result<bool, SelectError> {
        let letter = letter_for_key(key)?;
        self.select_letter(letter)
    }

    pub fn select_letter(&mut self, letter: char) -> Result<bool, SelectError> {
        let block = self.blocks.get_mut(self.cursor).ok_or(SelectError::NoBlock)?;
        let selection = select(block, letter, self.options.policy, &self.options.edit)?;
        if selection.changed {
            *block = selection.block;
        }
        Ok(selection.changed)
    }

    /// `(index, reason)` for every block without selectable options.
    pub fn non_standard(&self) -> Vec<(usize, &str)> {
        quiz_extract::non_standard(&self.blocks)
    }

    pub fn title(&self, block: &QuestionBlock) -> String {
        block.title(&self.options.edit.extract.syntax)
    }

    pub fn export(&self, view: ExportView) -> String {
        export(&self.blocks, view)
    }

    /// The loaded document with every edited block written back in place.
    ///
    /// Text outside the blocks, and blocks that were never edited, are kept
    /// byte for byte.
    pub fn render(&self) -> String {
        let mut output = String::with_capacity(self.document.len());
        let mut cursor = 0usize;

        for (span, block) in self.spans.iter().zip(&self.blocks) {
            if block.raw_text() == span.text() {
                continue;
            }
            let slice = &self.document[span.start..span.end];
            let start = span.start + (slice.len() - slice.trim_start().len());
            let end = start + slice.trim().len();

            output.push_str(&self.document[cursor..start]);
            output.push_str(block.raw_text());
            cursor = end;
        }

        output.push_str(&self.document[cursor..]);
        output
    }

    /// [`render`](Self::render), refusing output that would reload as a
    /// different number of blocks.
    pub fn render_checked(&self) -> EditResult<String> {
        let rendered = self.render();
        let reloaded = load_with_spans(&rendered, &self.options.edit.extract).len();
        if reloaded != self.blocks.len() {
            return Err(EditError::Validation(format!(
                "edited document splits into {reloaded} blocks instead of {}",
                self.blocks.len()
            )));
        }
        Ok(rendered)
    }

    /// Whether any block differs from the loaded document.
    pub fn is_modified(&self) -> bool {
        self.spans
            .iter()
            .zip(&self.blocks)
            .any(|(span, block)| block.raw_text() != span.text())
    }

    pub fn save(&self, path: &Path, backup: bool) -> EditResult<()> {
        write_atomic(path, &self.render_checked()?, backup)
    }

    /// Writes the quoted export next to `path` and returns where it went.
    pub fn autosave(&self, path: &Path) -> EditResult<PathBuf> {
        let target = autosave_path(path);
        write_atomic(&target, &self.export(ExportView::Quoted), false)?;
        log::info!("autosaved to {}", target.display());
        Ok(target)
    }
}

/// Keeps only the first selected letter under the single-choice policy.
fn restrict_to_policy(block: &mut QuestionBlock, options: &SessionOptions) {
    if options.policy != SelectionPolicy::Single || block.selected_letters().len() <= 1 {
        return;
    }
    let first = block.selected_letters()[0];
    log::debug!(
        "block {}: keeping only {first} under single-choice policy",
        block.index()
    );
    *block = block.rebuild(block.raw_text(), vec![first], &options.edit.extract);
}
