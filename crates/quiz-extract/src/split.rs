use crate::fence::FenceTracker;
use crate::line::LineRecord;
use crate::state::State;
use crate::syntax::Syntax;
use crate::BlockSpan;

/// How a document is cut into question blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitStrategy {
    /// Cut on separator lines only.
    Separator,
    /// Each block runs from one quoted heading to the next.
    Heading,
    /// Heading strategy, falling back to separators when it finds at most
    /// one block.
    #[default]
    Auto,
}

pub fn split_blocks(lines: &[LineRecord], syntax: &Syntax, strategy: SplitStrategy) -> Vec<BlockSpan> {
    match strategy {
        SplitStrategy::Separator => split_by_separator(lines, syntax),
        SplitStrategy::Heading => split_by_heading(lines, syntax),
        SplitStrategy::Auto => {
            let blocks = split_by_heading(lines, syntax);
            if blocks.len() > 1 {
                log::debug!("heading split produced {} blocks", blocks.len());
                return blocks;
            }
            log::debug!(
                "heading split produced {} block(s), falling back to separators",
                blocks.len()
            );
            split_by_separator(lines, syntax)
        }
    }
}

pub fn split_by_separator(lines: &[LineRecord], syntax: &Syntax) -> Vec<BlockSpan> {
    let mut state = State::new();
    let mut fences = FenceTracker::default();

    for line in lines {
        let in_fence = fences.process(&line.text, syntax.quote_marker);

        if !in_fence && syntax.is_separator(&line.text) {
            state.exit_block(is_blank);
            continue;
        }

        if !state.is_within_block() {
            state.enter_block(line.start);
        }
        state.append_line(line);
    }

    state.finalize(is_blank)
}

pub fn split_by_heading(lines: &[LineRecord], syntax: &Syntax) -> Vec<BlockSpan> {
    let mut state = State::new();
    let mut fences = FenceTracker::default();
    let trailing = |text: &str| is_blank(text) || syntax.is_separator(text);

    for line in lines {
        let in_fence = fences.process(&line.text, syntax.quote_marker);

        if !in_fence && syntax.is_heading(&line.text) {
            state.exit_block(trailing);
            state.enter_block(line.start);
        }

        state.append_line(line);
    }

    state.finalize(trailing)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::split_lines;
    use pretty_assertions::assert_eq;

    fn texts(document: &str, strategy: SplitStrategy) -> Vec<String> {
        split_blocks(&split_lines(document), &Syntax::default(), strategy)
            .iter()
            .map(BlockSpan::text)
            .collect()
    }

    #[test]
    fn separator_runs_yield_no_empty_blocks() {
        let document = "\n first \n---\n---\n\n---\nsecond\n---\n   \n";
        assert_eq!(
            texts(document, SplitStrategy::Separator),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn separator_inside_fence_is_content() {
        let document = "a\n```\n---\n```\n---\nb";
        assert_eq!(
            texts(document, SplitStrategy::Separator),
            vec!["a\n```\n---\n```".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn heading_split_drops_preamble_and_separators() {
        let document = "title\n\n> ## Q1\nbody one\n---\n> ## Q2\n> - [ ] A. x\n";
        assert_eq!(
            texts(document, SplitStrategy::Heading),
            vec![
                "> ## Q1\nbody one".to_string(),
                "> ## Q2\n> - [ ] A. x".to_string()
            ]
        );
    }

    #[test]
    fn heading_split_tolerates_missing_separators() {
        let document = "> ## Q1\none\n> ## Q2\ntwo\n\n---\n\n> ## Q3\nthree";
        assert_eq!(texts(document, SplitStrategy::Auto).len(), 3);
    }

    #[test]
    fn auto_falls_back_when_single_heading() {
        let document = "> ## Q1\none\n---\nno heading here\n";
        assert_eq!(
            texts(document, SplitStrategy::Auto),
            vec!["> ## Q1\none".to_string(), "no heading here".to_string()]
        );
    }

    #[test]
    fn spans_cover_block_bytes() {
        let document = "one\n---\ntwo\n";
        let spans = split_blocks(&split_lines(document), &Syntax::default(), SplitStrategy::Separator);
        assert_eq!(&document[spans[1].start..spans[1].end], "two\n");
    }
}
