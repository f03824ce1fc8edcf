//! Snapshot store
//!
//! Persists each resource collection as a pretty-printed JSON snapshot plus a
//! flattened CSV export inside one run directory. Existing snapshots double
//! as checkpoints: the correlator reads them back instead of taking an
//! in-memory handoff, so it can be rerun on its own.

use crate::error::{RosterError, RosterResult};
use crate::model::Resource;
use crate::output::{to_json, Table, Tabular};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the final joined report
pub const REPORT_FILE: &str = "project_report.csv";

/// Run-scoped directory holding snapshots and exports
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open the store, creating the directory if it does not exist
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created
    pub fn open(dir: impl Into<PathBuf>) -> RosterResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| RosterError::fs(&dir, e))?;
        Ok(Self { dir })
    }

    /// Open an existing directory without creating it
    ///
    /// # Errors
    /// Returns `SnapshotMissing` if the directory does not exist
    pub fn existing(dir: impl Into<PathBuf>) -> RosterResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(RosterError::SnapshotMissing(dir));
        }
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn snapshot_path(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.snapshot_file())
    }

    #[must_use]
    pub fn table_path(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.table_file())
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    /// Whether a snapshot for this resource is already on disk
    #[must_use]
    pub fn has_snapshot(&self, resource: Resource) -> bool {
        self.snapshot_path(resource).is_file()
    }

    /// Load a resource snapshot
    ///
    /// # Errors
    /// Returns `SnapshotMissing` if absent, or an error if unreadable
    pub fn load<T: DeserializeOwned>(&self, resource: Resource) -> RosterResult<Vec<T>> {
        let path = self.snapshot_path(resource);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RosterError::SnapshotMissing(path));
            }
            Err(e) => return Err(RosterError::fs(&path, e)),
        };
        serde_json::from_str(&content).map_err(|e| RosterError::json(&path, e))
    }

    /// Write a resource snapshot and its tabular export
    ///
    /// # Errors
    /// Returns an error if either file cannot be written
    pub fn save<T: Serialize + Tabular>(
        &self,
        resource: Resource,
        records: &[T],
    ) -> RosterResult<()> {
        let path = self.snapshot_path(resource);
        let json = to_json(records).map_err(|e| RosterError::json(&path, e))?;
        write_file(&path, &json)?;
        write_file(
            &self.table_path(resource),
            &Table::from_records(records).to_csv(),
        )?;
        tracing::info!(
            resource = %resource,
            records = records.len(),
            path = %path.display(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Write a CSV table to a file inside the store
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn write_table(&self, file_name: &str, table: &Table) -> RosterResult<PathBuf> {
        let path = self.dir.join(file_name);
        write_file(&path, &table.to_csv())?;
        Ok(path)
    }

    /// Delete a resource's snapshot and export; missing files are ignored
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be removed
    pub fn remove(&self, resource: Resource) -> RosterResult<()> {
        for path in [self.snapshot_path(resource), self.table_path(resource)] {
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed artifact"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(RosterError::fs(&path, e)),
            }
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> RosterResult<()> {
    fs::write(path, content).map_err(|e| RosterError::fs(path, e))
}
