//! Markdown rendering for the mdpad preview pane.

pub mod markdown;
pub mod sanitize;

pub use markdown::{document_title, to_html, ComrakRenderer, Renderer};
pub use sanitize::escape_text;
