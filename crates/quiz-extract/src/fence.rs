/// Tracks fenced code blocks so structure lines inside them are ignored.
///
/// Fences may sit inside a quote (`> ```rust`), which is common for code in
/// the answer part of a question.
#[derive(Default)]
pub(crate) struct FenceTracker {
    fenced: Option<FencedBlock>,
}

#[derive(Clone, Copy)]
struct FencedBlock {
    fence_char: char,
    fence_len: usize,
}

impl FenceTracker {
    /// Returns `true` when `line` is a fence line or lies inside a fence.
    pub(crate) fn process(&mut self, line: &str, quote_marker: char) -> bool {
        let line = unquote(line, quote_marker);

        if let Some(fence) = self.fenced {
            if is_closing_fence(line, fence) {
                self.fenced = None;
            }
            return true;
        }

        if let Some(fence) = detect_fence_start(line) {
            self.fenced = Some(fence);
            return true;
        }

        false
    }
}

fn unquote(line: &str, quote_marker: char) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix(quote_marker) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

fn detect_fence_start(line: &str) -> Option<FencedBlock> {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return None;
    }

    let mut chars = rest.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = 1 + chars.take_while(|ch| *ch == first).count();
    if count < 3 {
        return None;
    }

    Some(FencedBlock {
        fence_char: first,
        fence_len: count,
    })
}

fn is_closing_fence(line: &str, fence: FencedBlock) -> bool {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return false;
    }

    let trimmed = rest.trim_end();
    !trimmed.is_empty()
        && trimmed.chars().all(|ch| ch == fence.fence_char)
        && trimmed.chars().count() >= fence.fence_len
}

fn split_indent(line: &str) -> (usize, &str) {
    let mut width = 0usize;

    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => return (width, &line[idx..]),
        }
    }

    (width, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_quoted_fences() {
        let mut tracker = FenceTracker::default();
        assert!(!tracker.process("> plain", '>'));
        assert!(tracker.process("> ```", '>'));
        assert!(tracker.process("---", '>'));
        assert!(tracker.process("> ```", '>'));
        assert!(!tracker.process("---", '>'));
    }

    #[test]
    fn longer_fence_needs_longer_close() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.process("~~~~", '>'));
        assert!(tracker.process("~~~", '>'));
        assert!(tracker.process("~~~~~", '>'));
        assert!(!tracker.process("text", '>'));
    }
}
