//! mdpad: a live-preview markdown editing workspace.
//!
//! [`Workspace`] ties an [`mdsession::EditSession`] to a markdown renderer,
//! a status line and the export/download flows.

pub mod config;
pub mod export;
pub mod file_manager;
pub mod logging;
pub mod status_manager;
pub mod workspace;

pub use config::Config;
pub use export::{ExportMode, ExportOptions, ExportOutput, Exporter, HtmlDocumentExporter};
pub use workspace::{Preview, Workspace};

pub use mdcore::{ComrakRenderer, Renderer};
pub use mdsession::{EditSession, FormatAction, Metrics, PatternError, Selection};
