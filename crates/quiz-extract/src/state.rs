use crate::line::LineRecord;
use crate::BlockSpan;

/// Accumulates lines into blocks while the splitter walks a document.
#[derive(Default)]
pub struct State {
    blocks: Vec<BlockSpan>,
    current: Option<BlockBuilder>,
}

impl State {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: None,
        }
    }

    pub fn is_within_block(&self) -> bool {
        self.current.is_some()
    }

    pub fn enter_block(&mut self, start: usize) {
        self.current = Some(BlockBuilder::new(start));
    }

    pub fn append_line(&mut self, line: &LineRecord) {
        if let Some(current) = &mut self.current {
            current.push_line(line);
        }
    }

    /// Closes the open block, dropping trailing lines rejected by `trailing`.
    pub fn exit_block(&mut self, trailing: impl Fn(&str) -> bool) {
        if let Some(mut current) = self.current.take() {
            current.trim_trailing(trailing);
            let span = current.into_span();
            if !span.text().is_empty() {
                self.blocks.push(span);
            }
        }
    }

    pub fn finalize(mut self, trailing: impl Fn(&str) -> bool) -> Vec<BlockSpan> {
        self.exit_block(trailing);
        self.blocks
    }
}

struct BlockBuilder {
    lines: Vec<LineRecord>,
    start: usize,
}

impl BlockBuilder {
    fn new(start: usize) -> Self {
        Self {
            lines: Vec::new(),
            start,
        }
    }

    fn push_line(&mut self, line: &LineRecord) {
        self.lines.push(line.clone());
    }

    fn trim_trailing(&mut self, trailing: impl Fn(&str) -> bool) {
        while self.lines.last().is_some_and(|line| trailing(&line.text)) {
            self.lines.pop();
        }
    }

    fn into_span(self) -> BlockSpan {
        let end = self.lines.last().map(|line| line.end).unwrap_or(self.start);
        BlockSpan {
            lines: self.lines.into_iter().map(|line| line.text).collect(),
            start: self.start,
            end,
        }
    }
}
