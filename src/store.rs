//! Batch persistence.
//!
//! Each labelled batch becomes its own CSV file named after the local time
//! it was written, e.g. `tweets_20250127_142501.csv`.  Files are created
//! with `create_new`, so an existing batch is never overwritten; a second
//! batch inside the same second gets a `_1`, `_2`, ... suffix.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::source::PostRecord;

const FILE_PREFIX: &str = "tweets_";
const FILE_EXTENSION: &str = "csv";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Directory of batch files.
#[derive(Debug, Clone)]
pub struct BatchStore {
    dir: PathBuf,
}

impl BatchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `records` to a new file stamped with the current local time.
    pub fn write_batch(&self, records: &[PostRecord]) -> Result<PathBuf> {
        self.write_batch_at(records, Local::now().naive_local())
    }

    /// Write `records` to a new file stamped with `at`.
    pub fn write_batch_at(&self, records: &[PostRecord], at: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let stamp = at.format(STAMP_FORMAT).to_string();
        let (path, file) = (0u32..)
            .map(|n| self.dir.join(file_name(&stamp, n)))
            .find_map(|path| {
                match OpenOptions::new().write(true).create_new(true).open(&path) {
                    Ok(file) => Some(Ok((path, file))),
                    Err(err) if err.kind() == ErrorKind::AlreadyExists => None,
                    Err(err) => Some(
                        Err(err).with_context(|| format!("failed to create {}", path.display())),
                    ),
                }
            })
            .context("ran out of batch file names")??;

        let mut writer = csv::Writer::from_writer(file);
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        debug!(path = %path.display(), rows = records.len(), "batch written");
        Ok(path)
    }

    /// Batch files in the directory, sorted by name.
    ///
    /// A missing directory is treated as empty.
    pub fn batch_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "output directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list {}", self.dir.display()))
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                debug!(path = %path.display(), "skipping non-csv file");
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    /// Read and concatenate every batch file, in file-name order.
    pub fn read_all(&self) -> Result<Vec<PostRecord>> {
        let mut records = Vec::new();
        for path in self.batch_files()? {
            let mut reader = csv::Reader::from_path(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            for row in reader.deserialize() {
                let record: PostRecord =
                    row.with_context(|| format!("bad row in {}", path.display()))?;
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn file_name(stamp: &str, n: u32) -> String {
    if n == 0 {
        format!("{FILE_PREFIX}{stamp}.{FILE_EXTENSION}")
    } else {
        format!("{FILE_PREFIX}{stamp}_{n}.{FILE_EXTENSION}")
    }
}
