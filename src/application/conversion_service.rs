use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MdTextConfig;
use crate::domain::document::{BatchReport, Conversion, ConversionService};
use crate::infrastructure::file_system::{
    find_markdown_files, load_markdown_file, output_path_for, write_output, LoadError,
};
use crate::infrastructure::markdown::convert_markdown_to_text;
use crate::infrastructure::stats::text_stats;

/// Converter plus file gate, driven by the loaded configuration.
pub struct ConversionServiceImpl {
    config: Arc<MdTextConfig>,
}

impl ConversionServiceImpl {
    pub fn new(config: Arc<MdTextConfig>) -> Self {
        Self { config }
    }

    // Converts and writes one file of a batch.
    fn convert_one(&self, input_root: &Path, path: &Path) -> Result<PathBuf, ConvertFileError> {
        let markdown = load_markdown_file(path, &self.config.input)?;
        let conversion = self.convert_text(&markdown);
        let target = output_path_for(path, input_root, &self.config.output);
        write_output(&target, &conversion.text).map_err(ConvertFileError::Write)?;
        Ok(target)
    }
}

enum ConvertFileError {
    Load(LoadError),
    Write(anyhow::Error),
}

impl From<LoadError> for ConvertFileError {
    fn from(e: LoadError) -> Self {
        ConvertFileError::Load(e)
    }
}

#[async_trait]
impl ConversionService for ConversionServiceImpl {
    fn convert_text(&self, markdown: &str) -> Conversion {
        let text = convert_markdown_to_text(markdown);
        debug!("Converted {} bytes of markdown into {} bytes of text", markdown.len(), text.len());
        Conversion {
            source_stats: text_stats(markdown),
            output_stats: text_stats(&text),
            text,
        }
    }

    async fn convert_file(&self, path: &Path) -> Result<Conversion, LoadError> {
        info!("Converting file {:?}", path);
        let input = self.config.input.clone();
        let owned_path = path.to_path_buf();

        let loaded = tokio::task::spawn_blocking(move || load_markdown_file(&owned_path, &input))
            .await
            .map_err(|e| LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        let markdown = match loaded {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!("{}: {}", e.title(), e);
                return Err(e);
            }
        };

        let converted = tokio::task::spawn_blocking(move || {
            let text = convert_markdown_to_text(&markdown);
            (text_stats(&markdown), text)
        })
        .await;

        match converted {
            Ok((source_stats, text)) => Ok(Conversion {
                output_stats: text_stats(&text),
                source_stats,
                text,
            }),
            Err(e) => Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            }),
        }
    }

    async fn convert_directory(&self, input_dir: &Path) -> anyhow::Result<BatchReport> {
        info!("Converting markdown files under {:?}", input_dir);
        let files = find_markdown_files(input_dir, &self.config.input)?;
        let mut report = BatchReport::default();

        // Results of an earlier run sit next to their sources; they are not
        // sources themselves.
        let targets: HashSet<PathBuf> = files
            .iter()
            .map(|path| output_path_for(path, input_dir, &self.config.output))
            .collect();

        for path in &files {
            if targets.contains(path) {
                debug!("Skipping {:?}: it is the output of another file", path);
                report.skipped += 1;
                continue;
            }
            match self.convert_one(input_dir, path) {
                Ok(target) => {
                    debug!("{:?} -> {:?}", path, target);
                    report.converted += 1;
                }
                Err(ConvertFileError::Load(e)) if e.is_rejection() => {
                    warn!("Skipping {:?}: {}", path, e);
                    report.skipped += 1;
                }
                Err(ConvertFileError::Load(e)) => {
                    error!("Failed to convert {:?}: {}", path, e);
                    report.failures.push((path.clone(), e.to_string()));
                }
                Err(ConvertFileError::Write(e)) => {
                    error!("Failed to convert {:?}: {:#}", path, e);
                    report.failures.push((path.clone(), format!("{:#}", e)));
                }
            }
        }

        info!(
            "Converted {} file(s) from {:?}: {} skipped, {} failed",
            report.converted,
            input_dir,
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }
}
