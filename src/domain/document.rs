use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infrastructure::file_system::LoadError;

/// Word and character counts for a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
}

// Result of converting one document, with stats for both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub text: String,
    pub source_stats: TextStats,
    pub output_stats: TextStats,
}

/// Outcome of converting every file under a directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub converted: usize,
    /// Files rejected by the input gate (wrong type, too large).
    pub skipped: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Converts in-memory Markdown text. Never fails.
    fn convert_text(&self, markdown: &str) -> Conversion;

    /// Reads a file through the input gate and converts its content.
    async fn convert_file(&self, path: &Path) -> Result<Conversion, LoadError>;

    /// Converts every accepted file under `input_dir` and writes the results.
    async fn convert_directory(&self, input_dir: &Path) -> anyhow::Result<BatchReport>;
}
