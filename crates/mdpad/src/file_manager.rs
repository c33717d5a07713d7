//! Loading markdown from disk and the "download as markdown" flow.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// MIME type of a markdown download.
pub const MARKDOWN_MIME: &str = "text/markdown";

const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// A written markdown artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDownload {
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: usize,
}

pub async fn open_markdown(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(anyhow::anyhow!("File not found: {}", path.display()));
    }

    if !path.is_file() {
        return Err(anyhow::anyhow!("Path is not a file: {}", path.display()));
    }

    match fs::metadata(path).await {
        Ok(metadata) => {
            if metadata.len() > LARGE_FILE_THRESHOLD {
                log::warn!(
                    "Large file detected ({} bytes): {}",
                    metadata.len(),
                    path.display()
                );
            }
        }
        Err(e) => {
            log::warn!("Failed to get file metadata: {}", e);
        }
    }

    match fs::read_to_string(path).await {
        Ok(content) => {
            if content.contains('\0') {
                return Err(anyhow::anyhow!(
                    "File looks like a binary file: {}",
                    path.display()
                ));
            }
            log::info!("Successfully opened file: {}", path.display());
            Ok(content)
        }
        Err(e) => {
            let error_msg = match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    format!("Permission denied: {}", path.display())
                }
                std::io::ErrorKind::NotFound => {
                    format!("File not found: {}", path.display())
                }
                std::io::ErrorKind::InvalidData => {
                    format!("File is not valid UTF-8: {}", path.display())
                }
                _ => {
                    format!("Failed to read file: {} - {}", path.display(), e)
                }
            };
            Err(anyhow::anyhow!(error_msg))
        }
    }
}

/// Write `content` verbatim to `dir/filename`. Only the final component of
/// `filename` is used. An existing non-empty file is backed up first.
pub async fn save_markdown(dir: &Path, filename: &str, content: &str) -> Result<MarkdownDownload> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid download filename: {:?}", filename))?;
    let path = dir.join(name);

    if content.len() as u64 > LARGE_FILE_THRESHOLD {
        log::warn!("Large download ({} bytes): {}", content.len(), path.display());
    }

    if !dir.exists() {
        fs::create_dir_all(dir).await.map_err(|e| {
            anyhow::anyhow!("Failed to create directory: {} - {}", dir.display(), e)
        })?;
        log::info!("Created directory: {}", dir.display());
    }

    if path.exists() {
        match fs::metadata(&path).await {
            Ok(metadata) => {
                if metadata.permissions().readonly() {
                    return Err(anyhow::anyhow!(
                        "Target file is read-only: {}",
                        path.display()
                    ));
                }
                if metadata.len() > 0 {
                    let backup_path = path.with_extension("bak");
                    if let Err(e) = fs::copy(&path, &backup_path).await {
                        log::warn!("Failed to create backup: {}", e);
                    } else {
                        log::info!("Created backup: {}", backup_path.display());
                    }
                }
            }
            Err(e) => {
                log::warn!("Failed to check target file metadata: {}", e);
            }
        }
    }

    match fs::write(&path, content.as_bytes()).await {
        Ok(_) => {
            log::info!("Saved markdown ({} bytes) to: {}", content.len(), path.display());
            Ok(MarkdownDownload {
                path,
                mime: MARKDOWN_MIME,
                bytes: content.len(),
            })
        }
        Err(e) => {
            let error_msg = match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    format!("Permission denied: {}", path.display())
                }
                std::io::ErrorKind::WriteZero => {
                    format!("Disk may be full: {}", path.display())
                }
                _ => {
                    format!("Failed to write file: {} - {}", path.display(), e)
                }
            };
            Err(anyhow::anyhow!(error_msg))
        }
    }
}
