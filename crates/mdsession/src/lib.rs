//! Editing session behind the mdpad editor: the text buffer and its
//! selection, snapshot-based undo/redo, case-insensitive regex find/replace,
//! toolbar formatting and document metrics.

pub mod error;
pub mod format;
pub mod history;
pub mod metrics;
pub mod search;
pub mod selection;
pub mod session;

pub use error::PatternError;
pub use format::FormatAction;
pub use metrics::Metrics;
pub use selection::Selection;
pub use session::EditSession;
