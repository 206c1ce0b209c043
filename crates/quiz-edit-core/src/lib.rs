//! Editing engine for markdown question banks: option repair, selection,
//! answer stripping, export, and a [`Session`] that ties them together.

pub mod diff;
pub mod error;
pub mod export;
pub mod fs;
pub mod repair;
pub mod select;
pub mod session;
pub mod strip;

pub use error::{EditError, EditResult, ExitCode, SelectError, SessionError};
pub use export::{export, ExportView, EXPORT_SEPARATOR};
pub use quiz_extract::{ExtractOptions, OptionShape, QuestionBlock};
pub use repair::{repair, repair_all, repair_text, RepairOutcome};
pub use select::{letter_for_key, select, set_checkbox, Selection, SelectionPolicy};
pub use session::{Session, SessionOptions};
pub use strip::{strip_answers, StripRules};

/// Extraction settings plus the stripping rules applied after a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOptions {
    pub extract: ExtractOptions,
    pub strip: StripRules,
}
