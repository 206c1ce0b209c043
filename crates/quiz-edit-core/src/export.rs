use std::fmt;
use std::str::FromStr;

use quiz_config::ViewSetting;
use quiz_extract::QuestionBlock;

pub const EXPORT_SEPARATOR: &str = "\n\n---\n\n";

/// Which text of each block an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportView {
    /// Quoted lines with their markers removed.
    #[default]
    Quoted,
    Unquoted,
    /// Full block text.
    Raw,
}

impl ExportView {
    pub fn of<'a>(&self, block: &'a QuestionBlock) -> &'a str {
        match self {
            ExportView::Quoted => block.quoted_view(),
            ExportView::Unquoted => block.unquoted_view(),
            ExportView::Raw => block.raw_text(),
        }
    }
}

impl From<ViewSetting> for ExportView {
    fn from(setting: ViewSetting) -> Self {
        match setting {
            ViewSetting::Quoted => ExportView::Quoted,
            ViewSetting::Unquoted => ExportView::Unquoted,
            ViewSetting::Raw => ExportView::Raw,
        }
    }
}

impl FromStr for ExportView {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse::<ViewSetting>().map(ExportView::from)
    }
}

impl fmt::Display for ExportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportView::Quoted => "quoted",
            ExportView::Unquoted => "unquoted",
            ExportView::Raw => "raw",
        };
        f.write_str(label)
    }
}

/// Joins the chosen view of every block with `---` separators.
///
/// Every block gets a section, empty or not, so sections line up with block
/// numbers. A non-empty export ends with a newline.
pub fn export(blocks: &[QuestionBlock], view: ExportView) -> String {
    let parts: Vec<&str> = blocks.iter().map(|block| view.of(block)).collect();

    if parts.is_empty() {
        return String::new();
    }

    let mut output = parts.join(EXPORT_SEPARATOR);
    output.push('\n');
    output
}
