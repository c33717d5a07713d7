//! One open document: the editing session, its live preview and the status
//! line, plus the export and download flows that consume them.
//!
//! A display layer holds a `Workspace`, forwards user actions to it and
//! redraws from [`Workspace::preview`] and [`Workspace::status`].

use anyhow::{Context, Result};
use mdcore::{document_title, ComrakRenderer, Renderer};
use mdsession::{EditSession, FormatAction, PatternError, Selection};
use std::ops::Range;
use std::path::Path;

use crate::config::Config;
use crate::export::{ExportMode, ExportOutput, Exporter, HtmlDocumentExporter};
use crate::file_manager::{self, MarkdownDownload};
use crate::status_manager::StatusManager;

/// Rendered state of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// The markdown this preview was rendered from.
    pub source: String,
    pub title: Option<String>,
    pub html: String,
}

impl Preview {
    pub fn render<R: Renderer + ?Sized>(renderer: &R, source: &str) -> Self {
        Self {
            source: source.to_string(),
            title: document_title(source),
            html: renderer.render(source),
        }
    }
}

pub struct Workspace<R: Renderer = ComrakRenderer> {
    session: EditSession,
    renderer: R,
    preview: Preview,
    config: Config,
    status: StatusManager,
}

impl Workspace<ComrakRenderer> {
    pub fn new(config: Config) -> Self {
        let renderer = ComrakRenderer::new().with_sanitize(config.preview.sanitize);
        Self::with_renderer(config, renderer)
    }
}

impl<R: Renderer> Workspace<R> {
    pub fn with_renderer(config: Config, renderer: R) -> Self {
        let session = EditSession::new().with_history_limit(config.history.max_entries);
        let preview = Preview::render(&renderer, session.text());
        let mut workspace = Self {
            session,
            renderer,
            preview,
            config,
            status: StatusManager::new(),
        };
        workspace.refresh_metrics();
        workspace
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn text(&self) -> &str {
        self.session.text()
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> &StatusManager {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusManager {
        &mut self.status
    }

    /// Change the preview font; applies to the next export.
    pub fn set_font_family(&mut self, family: &str) {
        if family.trim().is_empty() {
            self.status
                .set_warning("Font family cannot be empty".to_string());
            return;
        }
        self.config.preview.font_family = family.to_string();
        log::debug!("Preview font set to {}", family);
    }

    pub async fn open(&mut self, path: &Path) -> Result<()> {
        let content = file_manager::open_markdown(path).await?;
        self.load_text(content);
        self.status
            .set_info(format!("Loaded {}", path.display()));
        Ok(())
    }

    /// Load a new document: replace the buffer and start with empty
    /// undo/redo stacks.
    pub fn load_text(&mut self, text: impl Into<String>) {
        self.session.set_text(text);
        self.session.reset_history();
        self.refresh();
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        self.session.set_selection(start, end);
        self.refresh_metrics();
    }

    pub fn selection(&self) -> Selection {
        self.session.selection()
    }

    pub fn insert(&mut self, text: &str) {
        self.edit(|session| session.insert_at_cursor(text));
    }

    pub fn wrap_selection(&mut self, prefix: &str, suffix: &str) {
        self.edit(|session| session.wrap_selection(prefix, suffix));
    }

    pub fn set_range(&mut self, text: &str, start: usize, end: usize) {
        self.edit(|session| session.set_range_and_commit(text, start, end));
    }

    pub fn format(&mut self, action: FormatAction) {
        self.edit(|session| session.apply_format(action));
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.edit(|session| session.undo().is_some());
        if !changed {
            self.status.set_info("Nothing to undo".to_string());
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.edit(|session| session.redo().is_some());
        if !changed {
            self.status.set_info("Nothing to redo".to_string());
        }
        changed
    }

    pub fn search(&mut self, pattern: &str) -> Result<usize, PatternError> {
        match self.session.search(pattern) {
            Ok(count) => {
                if !pattern.is_empty() {
                    self.status.set_info(format!("{} matches", count));
                }
                Ok(count)
            }
            Err(e) => {
                self.status.set_error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn next_match(&mut self) -> Option<Range<usize>> {
        let range = self.session.next_match();
        self.refresh_metrics();
        range
    }

    pub fn prev_match(&mut self) -> Option<Range<usize>> {
        let range = self.session.prev_match();
        self.refresh_metrics();
        range
    }

    pub fn replace_current(&mut self, replacement: &str) -> bool {
        self.edit(|session| session.replace_current(replacement))
    }

    pub fn replace_all(&mut self, pattern: &str, replacement: &str) -> Result<usize, PatternError> {
        match self.edit(|session| session.replace_all(pattern, replacement)) {
            Ok(count) => {
                self.status.set_success(format!("Replaced {} occurrences", count));
                Ok(count)
            }
            Err(e) => {
                self.status.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// The built-in HTML exporter, using the current preview font.
    pub fn html_exporter(&self, output_dir: &Path) -> HtmlDocumentExporter {
        HtmlDocumentExporter::new(output_dir, self.config.preview.font_family.clone())
    }

    /// Export the current preview. Exporter failures are reported as a
    /// generic export error.
    pub async fn export(&mut self, exporter: &dyn Exporter, mode: ExportMode) -> Result<ExportOutput> {
        let options = self.config.export.options_for(mode);
        log::info!(
            "Exporting with {} ({:?}, {} {})",
            exporter.name(),
            mode,
            options.page_size.token(),
            options.orientation.token()
        );

        match exporter.export(&self.preview, &options, mode).await {
            Ok(output) => {
                if let ExportOutput::Saved(path) = &output {
                    self.status
                        .set_success(format!("Exported to {}", path.display()));
                }
                Ok(output)
            }
            Err(e) => {
                log::error!("Export via {} failed: {:#}", exporter.name(), e);
                self.status.set_error("Export failed".to_string());
                Err(e).context("export failed")
            }
        }
    }

    /// Save the raw buffer as a markdown file in `dir`.
    pub async fn download_markdown(&mut self, dir: &Path) -> Result<MarkdownDownload> {
        let filename = self.config.download.filename.clone();
        match file_manager::save_markdown(dir, &filename, self.session.text()).await {
            Ok(download) => {
                self.status
                    .set_success(format!("Saved {}", download.path.display()));
                Ok(download)
            }
            Err(e) => {
                self.status.set_error(format!("Download failed: {}", e));
                Err(e)
            }
        }
    }

    fn edit<T>(&mut self, f: impl FnOnce(&mut EditSession) -> T) -> T {
        let out = f(&mut self.session);
        self.refresh();
        out
    }

    /// Re-render when the buffer changed since the last render.
    fn refresh(&mut self) {
        if self.preview.source != self.session.text() {
            self.preview = Preview::render(&self.renderer, self.session.text());
        }
        self.refresh_metrics();
    }

    fn refresh_metrics(&mut self) {
        self.status.set_metrics(self.session.metrics());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingRenderer {
        calls: Cell<usize>,
    }

    impl Renderer for CountingRenderer {
        fn render(&self, markdown: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("<pre>{}</pre>", markdown)
        }
    }

    fn workspace() -> Workspace {
        Workspace::new(Config::default())
    }

    #[test]
    fn test_preview_follows_edits() {
        let mut ws = workspace();
        ws.insert("# Title");
        assert!(ws.preview().html.contains("<h1>Title</h1>"));
        assert_eq!(ws.preview().title.as_deref(), Some("Title"));

        ws.insert("\n\n**bold**");
        assert!(ws.preview().html.contains("<strong>bold</strong>"));

        assert!(ws.undo());
        assert!(!ws.preview().html.contains("<strong>"));
    }

    #[test]
    fn test_unchanged_buffer_is_not_rerendered() {
        let renderer = CountingRenderer {
            calls: Cell::new(0),
        };
        let mut ws = Workspace::with_renderer(Config::default(), renderer);
        ws.insert("abc");
        let calls = ws.renderer.calls.get();

        ws.set_selection(0, 1);
        ws.search("b").unwrap();
        ws.next_match();
        assert_eq!(ws.renderer.calls.get(), calls);
    }

    #[test]
    fn test_undo_on_empty_history_reports_status() {
        let mut ws = workspace();
        assert!(!ws.undo());
        let message = ws.status().get_current_message().unwrap();
        assert_eq!(message.content, "Nothing to undo");
    }

    #[test]
    fn test_invalid_search_sets_error_status() {
        let mut ws = workspace();
        ws.load_text("text");
        assert!(ws.search("(").is_err());
        assert_eq!(
            ws.status().get_current_message().unwrap().message_type,
            crate::status_manager::MessageType::Error
        );
    }

    #[test]
    fn test_metrics_follow_cursor() {
        let mut ws = workspace();
        ws.load_text("Hello world\nfoo");
        assert_eq!(
            ws.status().metrics_line(),
            "Ln 2, Col 4 | 3 words | 2 lines | 15 bytes"
        );
        ws.set_selection(0, 0);
        assert_eq!(ws.status().metrics().line, 1);
    }

    #[test]
    fn test_history_limit_from_config() {
        let mut config = Config::default();
        config.history.max_entries = Some(1);
        let mut ws = Workspace::new(config);
        ws.insert("a");
        ws.insert("b");
        assert!(ws.undo());
        assert!(!ws.undo());
        assert_eq!(ws.text(), "a");
    }

    #[test]
    fn test_load_text_starts_fresh_history() {
        let mut ws = workspace();
        ws.insert("first");
        ws.insert(" draft");
        ws.undo();

        ws.load_text("second");
        assert!(!ws.session().can_undo());
        assert!(!ws.session().can_redo());
        assert!(!ws.undo());
        assert_eq!(ws.text(), "second");
    }

    #[test]
    fn test_set_font_family() {
        let mut ws = workspace();
        ws.set_font_family("Georgia");
        assert_eq!(ws.config().preview.font_family, "Georgia");
        ws.set_font_family(" ");
        assert_eq!(ws.config().preview.font_family, "Georgia");
    }
}
