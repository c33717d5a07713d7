use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

use crate::export::{ExportMode, ExportOptions, Orientation, PageSize};

pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_MARGIN: f32 = 1.0;
pub const DEFAULT_IMAGE_QUALITY: u8 = 98;
pub const DEFAULT_EXPORT_FILENAME: &str = "KNFs_markdown.pdf";
pub const DEFAULT_PREVIEW_FILENAME: &str = "KNFs_markdown_preview.pdf";
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "KNFs_markdown.md";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub preview: PreviewConfig,
    pub export: ExportConfig,
    pub download: DownloadConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub font_family: String,
    #[serde(default = "default_true")]
    pub sanitize: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Page inset in inches.
    pub margin: f32,
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// 0-100
    pub image_quality: u8,
    pub filename: String,
    pub preview_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// `None` keeps every undo step.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview: PreviewConfig {
                font_family: String::from(DEFAULT_FONT_FAMILY),
                sanitize: true,
            },
            export: ExportConfig {
                margin: DEFAULT_MARGIN,
                page_size: PageSize::A4,
                orientation: Orientation::Portrait,
                image_quality: DEFAULT_IMAGE_QUALITY,
                filename: String::from(DEFAULT_EXPORT_FILENAME),
                preview_filename: String::from(DEFAULT_PREVIEW_FILENAME),
            },
            download: DownloadConfig {
                filename: String::from(DEFAULT_DOWNLOAD_FILENAME),
            },
            history: HistoryConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Options for one export run; previews use their own filename.
    pub fn options_for(&self, mode: ExportMode) -> ExportOptions {
        let filename = match mode {
            ExportMode::Save => self.filename.clone(),
            ExportMode::Preview => self.preview_filename.clone(),
        };
        ExportOptions {
            margin: self.margin,
            filename,
            image_quality: self.image_quality,
            page_size: self.page_size,
            orientation: self.orientation,
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, creating new one");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate()?;
                                log::info!(
                                    "Successfully loaded config from: {}",
                                    config_path.display()
                                );
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                // Keep the broken file around for the user
                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to backup broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            let mut config_to_save = self.clone();
            config_to_save.validate()?;

            if let Some(parent) = config_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create config directory: {} - {}",
                        parent.display(),
                        e
                    )
                })?;
            }

            let content = serde_json::to_string_pretty(&config_to_save)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            tokio::fs::write(&config_path, content).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write config file: {} - {}",
                    config_path.display(),
                    e
                )
            })?;
            log::info!("Successfully saved config to: {}", config_path.display());
        }
        Ok(())
    }

    /// Validate configuration values and fix invalid ones
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        if self.preview.font_family.trim().is_empty() {
            log::warn!("Empty preview font family, using default");
            self.preview.font_family = DEFAULT_FONT_FAMILY.to_string();
            has_issues = true;
        }

        if !self.export.margin.is_finite() || self.export.margin < 0.0 || self.export.margin > 10.0 {
            log::warn!("Invalid export margin: {}, using default", self.export.margin);
            self.export.margin = DEFAULT_MARGIN;
            has_issues = true;
        }

        if self.export.image_quality > 100 {
            log::warn!(
                "Invalid image quality: {}, using default",
                self.export.image_quality
            );
            self.export.image_quality = DEFAULT_IMAGE_QUALITY;
            has_issues = true;
        }

        if self.export.filename.trim().is_empty() {
            log::warn!("Empty export filename, using default");
            self.export.filename = DEFAULT_EXPORT_FILENAME.to_string();
            has_issues = true;
        }

        if self.export.preview_filename.trim().is_empty() {
            log::warn!("Empty preview filename, using default");
            self.export.preview_filename = DEFAULT_PREVIEW_FILENAME.to_string();
            has_issues = true;
        }

        if self.download.filename.trim().is_empty() {
            log::warn!("Empty download filename, using default");
            self.download.filename = DEFAULT_DOWNLOAD_FILENAME.to_string();
            has_issues = true;
        }

        if self.history.max_entries == Some(0) {
            log::warn!("History limit of 0 would disable undo, keeping all entries");
            self.history.max_entries = None;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MDPAD_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("MDPAD_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "mdpad", "mdpad").map(|dirs| dirs.config_dir().join("config.json"))
    }
}
