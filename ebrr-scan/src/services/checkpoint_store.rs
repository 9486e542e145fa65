//! Resumable scan checkpoint
//!
//! Persists `{"counties": [...], "records": [...]}` so an interrupted scan
//! restarts at the next unfinished county. Single writer only: two scans
//! sharing one checkpoint path race on read-modify-write.

use crate::models::{CountyRecords, Region};
use ebrr_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// On-disk checkpoint contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanCheckpoint {
    /// Finished regions in completion order (append-only)
    pub counties: Vec<Region>,
    /// Accumulated results as last passed to `record`
    pub records: Vec<CountyRecords>,
}

/// Checkpoint file handle plus the work set computed when it was opened
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    remaining: Vec<Region>,
    carried: Vec<CountyRecords>,
}

impl CheckpointStore {
    /// Open or create the checkpoint at `path`.
    ///
    /// Missing file: an empty checkpoint is written and every requested
    /// region remains. Existing file: remaining = requested minus finished
    /// (value equality, input order kept) and its records are carried over.
    /// I/O and parse failures are logged and returned.
    pub fn open(path: impl Into<PathBuf>, requested: &[Region]) -> Result<Self> {
        let path = path.into();

        let checkpoint = if path.exists() {
            let checkpoint = read_checkpoint(&path)?;
            info!(
                path = %path.display(),
                "Restarting with {} counties remaining out of {}",
                requested.len().saturating_sub(checkpoint.counties.len()),
                requested.len()
            );
            checkpoint
        } else {
            let checkpoint = ScanCheckpoint::default();
            write_checkpoint(&path, &checkpoint).map_err(|e| {
                error!(path = %path.display(), error = %e, "Error creating checkpoint");
                e
            })?;
            checkpoint
        };

        let remaining = requested
            .iter()
            .filter(|region| !checkpoint.counties.contains(region))
            .cloned()
            .collect();

        Ok(Self {
            path,
            remaining,
            carried: checkpoint.records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Regions still to scan, in requested order
    pub fn remaining(&self) -> &[Region] {
        &self.remaining
    }

    /// Results carried over from a previous run
    pub fn carried_records(&self) -> &[CountyRecords] {
        &self.carried
    }

    /// Mark `region` finished and replace the stored results with `records`.
    ///
    /// If the file has disappeared since `open`, the update is skipped with
    /// an error log and `Ok(())` is returned.
    pub fn record(&self, region: &Region, records: &[CountyRecords]) -> Result<()> {
        if !self.path.exists() {
            error!(
                path = %self.path.display(),
                county = %region.name,
                "Checkpoint file doesn't exist, update skipped"
            );
            return Ok(());
        }

        let mut checkpoint = read_checkpoint(&self.path)?;
        checkpoint.counties.push(region.clone());
        checkpoint.records = records.to_vec();

        write_checkpoint(&self.path, &checkpoint).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Error updating checkpoint");
            e
        })
    }

    /// Delete the checkpoint. An already-absent file is logged, not an error.
    pub fn finish(&self) -> Result<()> {
        if !self.path.exists() {
            error!(path = %self.path.display(), "Checkpoint file doesn't exist");
            return Ok(());
        }

        std::fs::remove_file(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Error deleting checkpoint");
            Error::Io(e)
        })
    }
}

fn read_checkpoint(path: &Path) -> Result<ScanCheckpoint> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Error loading checkpoint");
        Error::Io(e)
    })?;

    serde_json::from_str(&content).map_err(|e| {
        error!(path = %path.display(), error = %e, "Malformed checkpoint");
        Error::Checkpoint(format!("{}: {}", path.display(), e))
    })
}

/// Write via a temp file and rename so a crash never leaves half a file
fn write_checkpoint(path: &Path, checkpoint: &ScanCheckpoint) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(checkpoint)?;
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|s| s.to_str()).unwrap_or("tmp")
    ));
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
