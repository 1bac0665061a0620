//! Ingestion
//!
//! Sources of ordered batches for the monitor.
use crate::constants::STREAM_FILE_PREFIX;
use crate::data::{Batch, Frame};
use crate::errors::DriftWatchError;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered, finite sequence of batches. Batch indices start at 1.
pub trait BatchSource {
    fn batches(&self) -> Result<Box<dyn Iterator<Item = Result<Batch, DriftWatchError>> + '_>, DriftWatchError>;
}

/// First run of digits in a file name, 0 when there is none.
pub fn stream_file_key(file_name: &str) -> u64 {
    let digits: String = file_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Reads `stream_*.csv` files from a directory, ordered by the number in
/// their name.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        CsvDirectorySource {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The stream files in processing order.
    pub fn files(&self) -> Result<Vec<PathBuf>, DriftWatchError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| DriftWatchError::DataUnavailable(format!("{}: {}", self.dir.display(), e)))?;
        let mut files: Vec<(u64, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DriftWatchError::UnableToRead(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(STREAM_FILE_PREFIX) && name.ends_with(".csv") {
                files.push((stream_file_key(&name), entry.path()));
            }
        }
        files.sort();
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }
}

impl BatchSource for CsvDirectorySource {
    fn batches(&self) -> Result<Box<dyn Iterator<Item = Result<Batch, DriftWatchError>> + '_>, DriftWatchError> {
        let files = self.files()?;
        Ok(Box::new(files.into_iter().enumerate().map(|(i, path)| {
            let frame = Frame::from_csv_path(&path)?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            info!("Processing {} ({} rows)", path.display(), frame.n_rows());
            Ok(Batch::new(i + 1, &source, frame))
        })))
    }
}

/// Batches held in memory, yielded in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<(String, Frame)>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn push(&mut self, source: &str, frame: Frame) {
        self.frames.push((source.to_string(), frame));
    }
}

impl FromIterator<Frame> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        MemorySource {
            frames: iter
                .into_iter()
                .enumerate()
                .map(|(i, f)| (format!("batch_{}", i + 1), f))
                .collect(),
        }
    }
}

impl BatchSource for MemorySource {
    fn batches(&self) -> Result<Box<dyn Iterator<Item = Result<Batch, DriftWatchError>> + '_>, DriftWatchError> {
        Ok(Box::new(
            self.frames
                .iter()
                .enumerate()
                .map(|(i, (source, frame))| Ok(Batch::new(i + 1, source, frame.clone()))),
        ))
    }
}
