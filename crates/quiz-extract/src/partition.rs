use crate::syntax::Syntax;

/// Unquoted (question body) and quoted (answer/reference) views of a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    pub unquoted: String,
    pub quoted: String,
}

/// Splits `text` into its unquoted and quoted views.
///
/// Unquoted lines are kept verbatim. Quoted lines lose their surrounding
/// whitespace and exactly one quote marker, so a nested `> > x` line shows up
/// in the quoted view as `> x`. Both views are trimmed.
pub fn partition(text: &str, syntax: &Syntax) -> Partition {
    let mut unquoted = Vec::new();
    let mut quoted = Vec::new();

    for line in text.lines() {
        match syntax.strip_quote(line) {
            Some(rest) => quoted.push(rest.trim_end()),
            None => unquoted.push(line),
        }
    }

    Partition {
        unquoted: unquoted.join("\n").trim().to_string(),
        quoted: quoted.join("\n").trim().to_string(),
    }
}

pub fn unquoted_view(text: &str, syntax: &Syntax) -> String {
    partition(text, syntax).unquoted
}

pub fn quoted_view(text: &str, syntax: &Syntax) -> String {
    partition(text, syntax).quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BLOCK: &str = "> ## Q1\nWhich one?\n>   - [ ] A. yes  \n> > nested\n  plain indented\n>\n> - [x] B. no";

    #[test]
    fn separates_views() {
        let views = partition(BLOCK, &Syntax::default());
        assert_eq!(views.unquoted, "Which one?\n  plain indented");
        assert_eq!(
            views.quoted,
            "## Q1\n- [ ] A. yes\n> nested\n\n- [x] B. no"
        );
    }

    #[test]
    fn unquoted_view_is_idempotent() {
        let syntax = Syntax::default();
        let once = unquoted_view(BLOCK, &syntax);
        assert_eq!(unquoted_view(&once, &syntax), once);
        assert_eq!(quoted_view(&once, &syntax), "");
    }

    #[test]
    fn views_reconstruct_block_lines() {
        let syntax = Syntax::default();
        let views = partition(BLOCK, &syntax);

        let mut rebuilt: Vec<String> = views
            .quoted
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| format!("> {line}"))
            .chain(views.unquoted.lines().map(str::to_string))
            .map(|line| normalize(&line, &syntax))
            .collect();
        let mut original: Vec<String> = BLOCK
            .lines()
            .map(|line| normalize(line, &syntax))
            .filter(|line| !line.is_empty())
            .collect();
        rebuilt.sort();
        original.sort();

        assert_eq!(rebuilt, original);
    }

    fn normalize(line: &str, syntax: &Syntax) -> String {
        match syntax.strip_quote(line) {
            Some(rest) => rest.trim().to_string(),
            None => line.trim().to_string(),
        }
    }
}
