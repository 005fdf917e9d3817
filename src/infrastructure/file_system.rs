use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::{InputConfig, OutputConfig};

/// Reasons a file is refused or cannot be read.
///
/// The display strings are meant for end users.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid file type: {path:?}. Please select a .md, .markdown, or .txt file.")]
    UnsupportedFileType { path: PathBuf },

    #[error("File too large: {path:?} is {size} bytes, the limit is {limit} bytes.")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {path:?}")]
    InvalidUtf8 { path: PathBuf },
}

impl LoadError {
    /// Short title for notifications, e.g. a tool error header.
    pub fn title(&self) -> &'static str {
        match self {
            LoadError::UnsupportedFileType { .. } => "Invalid File Type",
            LoadError::FileTooLarge { .. } => "File Too Large",
            LoadError::Io { .. } | LoadError::InvalidUtf8 { .. } => "File Read Error",
        }
    }

    /// Gate rejections, as opposed to failures while reading.
    pub fn is_rejection(&self) -> bool {
        matches!(self, LoadError::UnsupportedFileType { .. } | LoadError::FileTooLarge { .. })
    }
}

/// Reads a Markdown or text file after checking its extension and size.
///
/// # Arguments
///
/// * `path` - File to read.
/// * `input` - Allowed extensions and size limit.
///
/// # Returns
///
/// The file content, or the [`LoadError`] describing why it was refused.
pub fn load_markdown_file(path: &Path, input: &InputConfig) -> Result<String, LoadError> {
    if !input.accepts_extension(path) {
        return Err(LoadError::UnsupportedFileType { path: path.to_path_buf() });
    }

    let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let size = metadata.len();
    if size > input.max_file_size_bytes {
        return Err(LoadError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: input.max_file_size_bytes,
        });
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {:?}", bytes.len(), path);
    String::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8 { path: path.to_path_buf() })
}

/// Recursively lists files under `dir` whose extension passes the input gate.
/// Paths are returned sorted so batch output is deterministic.
pub fn find_markdown_files(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!("Specified path is not a directory: {:?}", dir));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && input.accepts_extension(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();

    if files.is_empty() {
        warn!("No markdown files found in {:?}", dir);
    }
    Ok(files)
}

/// Where the converted form of `input_file` goes.
///
/// With an output directory, the path relative to `input_root` is mirrored
/// under it; otherwise the result sits beside the source. The extension is
/// always replaced by the configured one. The target never names the source
/// itself: when it would (a `.txt` source converted beside itself, or an
/// output directory equal to the input root), `.converted` is inserted
/// before the extension, so `notes.txt` becomes `notes.converted.txt`.
pub fn output_path_for(input_file: &Path, input_root: &Path, output: &OutputConfig) -> PathBuf {
    let extension = output.file_extension.trim_start_matches('.');
    let target = match &output.output_dir {
        Some(dir) => {
            let relative = input_file
                .strip_prefix(input_root)
                .ok()
                .filter(|rel| !rel.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .or_else(|| input_file.file_name().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("converted-text"));
            dir.join(relative)
        }
        None => input_file.to_path_buf(),
    };
    let target = target.with_extension(extension);
    if same_file_name(&target, input_file) {
        target.with_extension(format!("converted.{}", extension))
    } else {
        target
    }
}

// Case-insensitive so `NOTES.TXT` and `NOTES.txt` collide on every filesystem.
fn same_file_name(a: &Path, b: &Path) -> bool {
    let name_matches = match (a.file_name(), b.file_name()) {
        (Some(a), Some(b)) => a.to_string_lossy().eq_ignore_ascii_case(&b.to_string_lossy()),
        _ => false,
    };
    name_matches && a.parent() == b.parent()
}

pub fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {:?}", parent))?;
        }
    }
    fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
    debug!("Wrote {} bytes to {:?}", text.len(), path);
    Ok(())
}
