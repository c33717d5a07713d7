use anyhow::Result;
use async_trait::async_trait;
use mdpad::{
    Config, ExportMode, ExportOptions, ExportOutput, Exporter, FormatAction, Preview, Workspace,
};
use tempfile::TempDir;

struct FailingExporter;

#[async_trait]
impl Exporter for FailingExporter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn export(
        &self,
        _preview: &Preview,
        _options: &ExportOptions,
        _mode: ExportMode,
    ) -> Result<ExportOutput> {
        Err(anyhow::anyhow!("converter crashed"))
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn test_open_edit_and_download() {
    init_logger();
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("notes.md");
    tokio::fs::write(&source, "intro\nSection").await.unwrap();

    let mut ws = Workspace::new(Config::default());
    ws.open(&source).await.unwrap();
    assert!(!ws.session().can_undo());

    ws.set_selection(9, 9);
    ws.format(FormatAction::Heading(2));
    ws.set_selection(0, 5);
    ws.format(FormatAction::Bold);
    assert_eq!(ws.text(), "**intro**\n## Section");
    assert!(ws.preview().html.contains("<h2>Section</h2>"));

    let download = ws.download_markdown(&temp_dir.path().join("out")).await.unwrap();
    assert_eq!(download.mime, "text/markdown");
    assert!(download.path.ends_with("KNFs_markdown.md"));
    let written = tokio::fs::read_to_string(&download.path).await.unwrap();
    assert_eq!(written, "**intro**\n## Section");
}

#[tokio::test]
async fn test_open_discards_previous_document_history() {
    init_logger();
    let temp_dir = TempDir::new().unwrap();
    let other = temp_dir.path().join("b.md");
    tokio::fs::write(&other, "# B\n").await.unwrap();

    let mut ws = Workspace::new(Config::default());
    ws.insert("draft of A");
    assert!(ws.session().can_undo());

    ws.open(&other).await.unwrap();
    assert!(!ws.undo());
    assert_eq!(ws.text(), "# B\n");
    assert!(!ws.redo());
    assert!(ws.preview().html.contains("<h1>B</h1>"));
}

#[tokio::test]
async fn test_find_replace_round_trip() {
    init_logger();
    let mut ws = Workspace::new(Config::default());
    ws.load_text("Cat and cat and CAT");

    assert_eq!(ws.search("cat").unwrap(), 3);
    assert_eq!(ws.next_match(), Some(8..11));
    assert!(ws.replace_current("dog"));
    assert_eq!(ws.text(), "Cat and dog and CAT");
    assert_eq!(ws.session().match_count(), 2);

    assert_eq!(ws.replace_all("cat", "bird").unwrap(), 2);
    assert_eq!(ws.text(), "bird and dog and bird");

    assert!(ws.undo());
    assert_eq!(ws.text(), "Cat and dog and CAT");
    assert!(ws.redo());
    assert_eq!(ws.text(), "bird and dog and bird");
    assert!(ws.preview().html.contains("bird and dog"));
}

#[tokio::test]
async fn test_export_save_and_preview() {
    init_logger();
    let temp_dir = TempDir::new().unwrap();
    let mut ws = Workspace::new(Config::default());
    ws.insert("# Report\n\nSome *text*.");
    ws.set_font_family("Georgia");

    let exporter = ws.html_exporter(temp_dir.path());
    let output = ws.export(&exporter, ExportMode::Save).await.unwrap();
    let path = match output {
        ExportOutput::Saved(path) => path,
        other => panic!("unexpected output: {:?}", other),
    };
    assert_eq!(path, temp_dir.path().join("KNFs_markdown.html"));
    let document = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(document.contains("<title>Report</title>"));
    assert!(document.contains("font-family: Georgia;"));
    assert!(document.contains("size: A4 portrait; margin: 1in;"));

    let output = ws.export(&exporter, ExportMode::Preview).await.unwrap();
    assert!(matches!(output, ExportOutput::DataUri(ref uri) if uri.starts_with("data:text/html;base64,")));
}

#[tokio::test]
async fn test_export_failure_is_generic_error() {
    init_logger();
    let mut ws = Workspace::new(Config::default());
    ws.insert("text");

    let err = ws
        .export(&FailingExporter, ExportMode::Save)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "export failed");
    assert_eq!(
        ws.status().get_current_message().unwrap().content,
        "Export failed"
    );
    // The session is untouched
    assert_eq!(ws.text(), "text");
}
