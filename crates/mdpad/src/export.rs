//! Exporting the rendered preview.
//!
//! [`Exporter`] is the seam for document converters (PDF, images). The
//! built-in [`HtmlDocumentExporter`] writes a standalone, print-ready HTML
//! page or returns it as a `data:` URI for previews.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use mdcore::escape_text;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::workspace::Preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// The paper size token used in configuration.
    pub fn token(&self) -> &'static str {
        match self {
            PageSize::A3 => "a3",
            PageSize::A4 => "a4",
            PageSize::A5 => "a5",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
        }
    }

    fn css_keyword(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn token(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Page inset in inches.
    pub margin: f32,
    pub filename: String,
    /// 0-100
    pub image_quality: u8,
    pub page_size: PageSize,
    pub orientation: Orientation,
}

impl ExportOptions {
    /// Image quality as the 0-1 fraction converters expect.
    pub fn quality_fraction(&self) -> f32 {
        f32::from(self.image_quality.min(100)) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Write the document to disk.
    Save,
    /// Produce an inline `data:` URI for an in-app preview.
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    Saved(PathBuf),
    DataUri(String),
}

#[async_trait]
pub trait Exporter: Send + Sync {
    fn name(&self) -> &str;

    async fn export(
        &self,
        preview: &Preview,
        options: &ExportOptions,
        mode: ExportMode,
    ) -> Result<ExportOutput>;
}

pub struct HtmlDocumentExporter {
    output_dir: PathBuf,
    font_family: String,
}

impl HtmlDocumentExporter {
    pub fn new(output_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            font_family: font_family.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn build_document(&self, preview: &Preview, options: &ExportOptions) -> String {
        let title = preview.title.as_deref().unwrap_or("Untitled");
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"generator\" content=\"mdpad\">\n\
             <meta name=\"generated\" content=\"{generated}\">\n\
             <meta name=\"image-quality\" content=\"{quality:.2}\">\n\
             <title>{title}</title>\n\
             <style>\n\
             @page {{ size: {size} {orientation}; margin: {margin}in; }}\n\
             body {{ font-family: {font}; }}\n\
             img {{ max-width: 100%; }}\n\
             </style>\n\
             </head>\n\
             <body>\n\
             {body}\
             </body>\n\
             </html>\n",
            generated = Utc::now().to_rfc3339(),
            quality = options.quality_fraction(),
            title = escape_text(title),
            size = options.page_size.css_keyword(),
            orientation = options.orientation.token(),
            margin = options.margin,
            font = css_safe(&self.font_family),
            body = preview.html,
        )
    }

    fn target_path(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid export filename: {:?}", filename))?;
        Ok(self.output_dir.join(name).with_extension("html"))
    }
}

#[async_trait]
impl Exporter for HtmlDocumentExporter {
    fn name(&self) -> &str {
        "html"
    }

    async fn export(
        &self,
        preview: &Preview,
        options: &ExportOptions,
        mode: ExportMode,
    ) -> Result<ExportOutput> {
        let document = self.build_document(preview, options);
        match mode {
            ExportMode::Preview => Ok(ExportOutput::DataUri(format!(
                "data:text/html;base64,{}",
                STANDARD.encode(document.as_bytes())
            ))),
            ExportMode::Save => {
                let path = self.target_path(&options.filename)?;
                fs::create_dir_all(&self.output_dir).await.with_context(|| {
                    format!("Failed to create export directory: {}", self.output_dir.display())
                })?;
                fs::write(&path, document.as_bytes())
                    .await
                    .with_context(|| format!("Failed to write export: {}", path.display()))?;
                log::info!("Exported document to: {}", path.display());
                Ok(ExportOutput::Saved(path))
            }
        }
    }
}

/// Drop characters that could break out of a CSS declaration.
fn css_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use tempfile::TempDir;

    fn options() -> ExportOptions {
        ExportOptions {
            margin: 1.0,
            filename: "KNFs_markdown.pdf".to_string(),
            image_quality: 80,
            page_size: PageSize::Letter,
            orientation: Orientation::Landscape,
        }
    }

    fn preview() -> Preview {
        Preview {
            source: "# A <b> title\n\nbody".to_string(),
            title: Some("A <b> title".to_string()),
            html: "<h1>A &lt;b&gt; title</h1>\n<p>body</p>\n".to_string(),
        }
    }

    #[test]
    fn test_quality_fraction() {
        let mut opts = options();
        assert!((opts.quality_fraction() - 0.8).abs() < f32::EPSILON);
        opts.image_quality = 200;
        assert_eq!(opts.quality_fraction(), 1.0);
        opts.image_quality = 0;
        assert_eq!(opts.quality_fraction(), 0.0);
    }

    #[test]
    fn test_page_tokens() {
        assert_eq!(PageSize::Letter.token(), "letter");
        assert_eq!(Orientation::Landscape.token(), "landscape");
        let parsed: PageSize = serde_json::from_str("\"a5\"").unwrap();
        assert_eq!(parsed, PageSize::A5);
    }

    #[test]
    fn test_build_document() {
        let exporter = HtmlDocumentExporter::new("/tmp", "Georgia; } body { color: red");
        let doc = exporter.build_document(&preview(), &options());
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("@page { size: letter landscape; margin: 1in; }"));
        let title = &doc[doc.find("<title>").unwrap()..doc.find("</title>").unwrap()];
        assert!(title.contains("&lt;b&gt;"));
        assert!(!title[7..].contains('<'));
        assert!(doc.contains("font-family: Georgia  body  color: red;"));
        assert!(doc.contains("<p>body</p>"));
    }

    #[tokio::test]
    async fn test_preview_returns_data_uri() {
        let exporter = HtmlDocumentExporter::new("/nonexistent", "serif");
        let output = exporter
            .export(&preview(), &options(), ExportMode::Preview)
            .await
            .unwrap();
        match output {
            ExportOutput::DataUri(uri) => {
                let encoded = uri.strip_prefix("data:text/html;base64,").unwrap();
                let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
                assert!(decoded.contains("<p>body</p>"));
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_writes_html_file() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = HtmlDocumentExporter::new(temp_dir.path().join("out"), "serif");
        let output = exporter
            .export(&preview(), &options(), ExportMode::Save)
            .await
            .unwrap();

        let expected = temp_dir.path().join("out").join("KNFs_markdown.html");
        assert_eq!(output, ExportOutput::Saved(expected.clone()));
        let written = tokio::fs::read_to_string(expected).await.unwrap();
        assert!(written.contains("<h1>"));
    }

    #[tokio::test]
    async fn test_save_strips_directories_from_filename() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = HtmlDocumentExporter::new(temp_dir.path(), "serif");
        let mut opts = options();
        opts.filename = "../../escape.pdf".to_string();
        let output = exporter
            .export(&preview(), &opts, ExportMode::Save)
            .await
            .unwrap();
        assert_eq!(
            output,
            ExportOutput::Saved(temp_dir.path().join("escape.html"))
        );
    }
}
