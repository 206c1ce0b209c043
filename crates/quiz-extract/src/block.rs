use crate::classify::{classify, extract_options, ChoiceOption, OptionShape, TrueFalseMarkers};
use crate::heading::{detect_heading, QuestionHeading};
use crate::partition::partition;
use crate::split::SplitStrategy;
use crate::syntax::Syntax;

/// Settings shared by every extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub syntax: Syntax,
    pub strategy: SplitStrategy,
    pub markers: TrueFalseMarkers,
}

/// One question unit of a loaded document.
///
/// The views, options and shape are derived from `raw_text` and cannot be
/// set directly; every text change goes through [`QuestionBlock::rebuild`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    index: usize,
    raw_text: String,
    unquoted_view: String,
    quoted_view: String,
    options: Vec<ChoiceOption>,
    shape: OptionShape,
    selected_letters: Vec<char>,
}

impl QuestionBlock {
    /// Derives a block from freshly split text.
    ///
    /// Checked options of a selectable block seed `selected_letters`, so a
    /// saved document reopens with the selection it was saved with.
    pub fn new(index: usize, raw_text: impl Into<String>, options: &ExtractOptions) -> Self {
        let mut block = Self::derive(index, raw_text.into(), Vec::new(), options);
        block.selected_letters = block.checked_letters();
        block
    }

    /// Letters whose checkbox is ticked, in document order.
    ///
    /// Empty for a block without selectable options.
    pub fn checked_letters(&self) -> Vec<char> {
        let mut letters = Vec::new();
        if !self.shape.is_standard() {
            return letters;
        }
        for option in self.options.iter().filter(|option| option.checked) {
            if !letters.contains(&option.letter) {
                letters.push(option.letter);
            }
        }
        letters
    }

    /// Re-derives the block from replacement text.
    ///
    /// Selected letters that no longer name an option are dropped.
    pub fn rebuild(
        &self,
        raw_text: impl Into<String>,
        selected_letters: Vec<char>,
        options: &ExtractOptions,
    ) -> Self {
        Self::derive(self.index, raw_text.into(), selected_letters, options)
    }

    fn derive(
        index: usize,
        raw_text: String,
        selected_letters: Vec<char>,
        options: &ExtractOptions,
    ) -> Self {
        let views = partition(&raw_text, &options.syntax);
        let choices = extract_options(&views.quoted, &options.syntax);
        let shape = classify(&choices, &options.markers);

        let mut selected: Vec<char> = Vec::with_capacity(selected_letters.len());
        for letter in selected_letters {
            let exists = choices.iter().any(|choice| choice.letter == letter);
            if exists && !selected.contains(&letter) {
                selected.push(letter);
            } else if !exists {
                log::debug!("block {index}: dropping stale selection {letter}");
            }
        }

        Self {
            index,
            raw_text,
            unquoted_view: views.unquoted,
            quoted_view: views.quoted,
            options: choices,
            shape,
            selected_letters: selected,
        }
    }

    /// 1-based position in the document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn unquoted_view(&self) -> &str {
        &self.unquoted_view
    }

    pub fn quoted_view(&self) -> &str {
        &self.quoted_view
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn shape(&self) -> &OptionShape {
        &self.shape
    }

    pub fn option_count(&self) -> usize {
        self.shape.option_count()
    }

    pub fn selected_letters(&self) -> &[char] {
        &self.selected_letters
    }

    pub fn is_selected(&self, letter: char) -> bool {
        self.selected_letters.contains(&letter)
    }

    /// The first question heading in the block, if any.
    pub fn heading(&self, syntax: &Syntax) -> Option<QuestionHeading> {
        self.raw_text
            .lines()
            .find_map(|line| detect_heading(syntax, line))
    }

    /// Heading text, or the first non-empty line when there is no heading.
    pub fn title(&self, syntax: &Syntax) -> String {
        if let Some(heading) = self.heading(syntax) {
            return heading.normalized;
        }
        self.raw_text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}
