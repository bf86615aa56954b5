//! Locating and reading the reference price table.

pub mod cache;
pub mod reader;

pub use cache::{Dataset, TableCache};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names never picked up by discovery: the reports this tool writes.
pub const DEFAULT_EXCLUDES: &[&str] = &["market_report.xlsx", "market_report.csv"];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no .csv or .xlsx file found in {0}")]
    NoSourceFound(PathBuf),
    #[error("unsupported file format '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse workbook: {0}")]
    Excel(String),
    #[error("workbook has no worksheets")]
    EmptyWorkbook,
}

impl SourceError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Supported source formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Xlsx,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceKind::Csv),
            "xlsx" => Ok(SourceKind::Xlsx),
            _ => Err(SourceError::UnsupportedFormat(ext)),
        }
    }
}

/// Where the table comes from: an explicit file, or the largest candidate
/// in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    File(PathBuf),
    Discover { dir: PathBuf, exclude: Vec<String> },
}

impl SourceSelection {
    pub fn resolve(&self) -> Result<PathBuf, SourceError> {
        match self {
            SourceSelection::File(path) => {
                SourceKind::from_path(path)?;
                Ok(path.clone())
            }
            SourceSelection::Discover { dir, exclude } => discover(dir, exclude),
        }
    }
}

/// Pick the source table in `dir`.
///
/// Candidates are regular files with a supported extension whose name is
/// not in `exclude`. When several qualify the largest by byte size is taken
/// as the authoritative dataset; equal sizes resolve to the smaller name.
pub fn discover(dir: &Path, exclude: &[String]) -> Result<PathBuf, SourceError> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::io(dir, e))?;

    let mut candidates: Vec<(u64, String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SourceError::io(dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if SourceKind::from_path(&path).is_err() || exclude.iter().any(|x| x == &name) {
            continue;
        }
        let metadata = fs::metadata(&path).map_err(|e| SourceError::io(&path, e))?;
        if !metadata.is_file() {
            continue;
        }
        log::debug!("candidate source {} ({} bytes)", name, metadata.len());
        candidates.push((metadata.len(), name, path));
    }

    candidates
        .into_iter()
        .max_by(|(size_a, name_a, _), (size_b, name_b, _)| {
            size_a.cmp(size_b).then_with(|| name_b.cmp(name_a))
        })
        .map(|(size, name, path)| {
            log::info!("using source {} ({} bytes)", name, size);
            path
        })
        .ok_or_else(|| SourceError::NoSourceFound(dir.to_path_buf()))
}
