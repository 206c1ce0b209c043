//! Question block extraction for markdown question banks.
//!
//! A document is cut into blocks ([`split`]), each block is partitioned into
//! its quoted and unquoted views ([`partition`]), and the checkbox options of
//! the quoted view are classified ([`classify`]). [`load`] runs the whole
//! pipeline and returns [`QuestionBlock`] values whose derived fields always
//! agree with their text.

mod block;
mod classify;
mod fence;
mod heading;
mod line;
mod partition;
mod split;
mod state;
mod syntax;

pub use block::{ExtractOptions, QuestionBlock};
pub use classify::{
    classify, classify_view, extract_options, ChoiceOption, OptionShape, TrueFalseMarkers,
    CHOICE_LETTERS,
};
pub use heading::{detect_heading, normalize_heading_text, QuestionHeading};
pub use line::{read_lines, split_lines, LineRecord};
pub use partition::{partition, quoted_view, unquoted_view, Partition};
pub use split::{split_blocks, split_by_heading, split_by_separator, SplitStrategy};
pub use syntax::{Checkbox, LineKind, ListItem, Syntax};

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

/// Raw lines of one block and the byte range it occupied in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub lines: Vec<String>,
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    /// Block text with surrounding whitespace trimmed.
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// Splits `document` into trimmed, non-empty block texts.
pub fn split_document(document: &str, options: &ExtractOptions) -> Vec<String> {
    let lines = split_lines(document);
    split_blocks(&lines, &options.syntax, options.strategy)
        .iter()
        .map(BlockSpan::text)
        .collect()
}

/// Splits, partitions and classifies `document`.
///
/// Non-standard blocks are kept; their reasons are available through
/// [`OptionShape::reason`] and [`non_standard`].
pub fn load(document: &str, options: &ExtractOptions) -> Vec<QuestionBlock> {
    load_with_spans(document, options)
        .into_iter()
        .map(|(_, block)| block)
        .collect()
}

/// Like [`load`], pairing each block with the span of `document` it was cut from.
pub fn load_with_spans(document: &str, options: &ExtractOptions) -> Vec<(BlockSpan, QuestionBlock)> {
    let lines = split_lines(document);
    load_lines(&lines, options)
}

pub fn load_from_reader<R: Read>(
    reader: &mut BufReader<R>,
    options: &ExtractOptions,
) -> io::Result<Vec<QuestionBlock>> {
    let lines = read_lines(reader)?;
    Ok(load_lines(&lines, options)
        .into_iter()
        .map(|(_, block)| block)
        .collect())
}

pub fn load_from_path(path: &Path, options: &ExtractOptions) -> io::Result<Vec<QuestionBlock>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    load_from_reader(&mut reader, options)
}

fn load_lines(lines: &[LineRecord], options: &ExtractOptions) -> Vec<(BlockSpan, QuestionBlock)> {
    let loaded: Vec<(BlockSpan, QuestionBlock)> =
        split_blocks(lines, &options.syntax, options.strategy)
            .into_iter()
            .enumerate()
            .map(|(idx, span)| {
                let block = QuestionBlock::new(idx + 1, span.text(), options);
                (span, block)
            })
            .collect();

    let mut irregular = 0;
    for (_, block) in &loaded {
        if let Some(reason) = block.shape().reason() {
            irregular += 1;
            log::info!("block {}: {reason}", block.index());
        }
    }
    log::info!("loaded {} blocks ({irregular} non-standard)", loaded.len());

    loaded
}

/// `(index, reason)` for every block whose options are not selectable.
pub fn non_standard(blocks: &[QuestionBlock]) -> Vec<(usize, &str)> {
    blocks
        .iter()
        .filter_map(|block| block.shape().reason().map(|reason| (block.index(), reason)))
        .collect()
}
