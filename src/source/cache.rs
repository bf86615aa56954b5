//! Process-lifetime cache of the loaded table, keyed by file fingerprint.

use super::reader::read_table;
use super::{SourceError, SourceKind, SourceSelection};
use crate::engine::{normalize, VehicleTable};
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Cheap identity of a file on disk, taken from its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub size: u64,
}

impl FileStamp {
    pub fn of(path: &Path) -> Result<Self, SourceError> {
        let metadata = fs::metadata(path).map_err(|e| SourceError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            size: metadata.len(),
        })
    }
}

/// File stamp plus a digest of the content that was actually parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub stamp: FileStamp,
    pub sha256: String,
}

impl Fingerprint {
    pub fn short_digest(&self) -> &str {
        &self.sha256[..12.min(self.sha256.len())]
    }

    pub fn modified_display(&self) -> String {
        self.stamp
            .modified
            .map(|t| {
                DateTime::<Local>::from(t)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// A normalized table together with where it came from.
#[derive(Debug)]
pub struct Dataset {
    pub fingerprint: Fingerprint,
    pub table: VehicleTable,
}

impl Dataset {
    /// Read, fingerprint and normalize the file behind `stamp`.
    pub fn load(stamp: FileStamp) -> Result<Self, SourceError> {
        let kind = SourceKind::from_path(&stamp.path)?;
        let bytes = fs::read(&stamp.path).map_err(|e| SourceError::io(&stamp.path, e))?;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let raw = read_table(kind, bytes)?;
        let table = normalize(&raw);

        let fingerprint = Fingerprint { stamp, sha256 };
        log::info!(
            "loaded {} vehicles from {} [{}]",
            table.len(),
            fingerprint.stamp.path.display(),
            fingerprint.short_digest()
        );
        Ok(Self { fingerprint, table })
    }

    pub fn source(&self) -> &Path {
        &self.fingerprint.stamp.path
    }
}

/// Holds at most one dataset and reuses it while the file is unchanged.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<Rc<Dataset>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the selection and return its dataset, reading the file only
    /// when path, size or modification time differ from the cached entry.
    pub fn load(&mut self, selection: &SourceSelection) -> Result<Rc<Dataset>, SourceError> {
        let path = selection.resolve()?;
        let stamp = FileStamp::of(&path)?;

        if let Some(cached) = &self.entry {
            if cached.fingerprint.stamp == stamp {
                log::debug!("reusing cached table for {}", path.display());
                return Ok(Rc::clone(cached));
            }
        }

        let dataset = Rc::new(Dataset::load(stamp)?);
        self.entry = Some(Rc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the cached dataset so the next load reads the file again.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("table cache invalidated");
        }
    }

    #[cfg(test)]
    pub fn cached(&self) -> Option<&Rc<Dataset>> {
        self.entry.as_ref()
    }
}
