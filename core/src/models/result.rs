use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::Timestamp;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResultStatus {
    Success,
    Failure,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: ResultStatus,
    pub last_execution_time: Timestamp,
}

/// One slot per check of the file, in the same order as the file's checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub verifications: Vec<CommandResult>,
}

/// Per-path results; the only state carried from one run to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub files: BTreeMap<PathBuf, FileResult>,
}

impl CommandResult {
    pub fn new(status: ResultStatus, last_execution_time: Timestamp) -> Self {
        Self {
            status,
            last_execution_time,
        }
    }
}

impl FileResult {
    pub fn new(verifications: Vec<CommandResult>) -> Self {
        Self { verifications }
    }

    /// No slot failed. Vacuously true for a file without checks.
    pub fn is_success(&self) -> bool {
        self.verifications
            .iter()
            .all(|r| r.status != ResultStatus::Failure)
    }

    /// Whether this result is too old or too weak to be reused.
    ///
    /// Only a result holding one slot per check (`num_checks`), every one of
    /// which succeeded at or after `base_time`, is reusable.
    pub fn need_verification(&self, base_time: Timestamp, num_checks: usize) -> bool {
        self.verifications.is_empty()
            || self.verifications.len() != num_checks
            || self
                .verifications
                .iter()
                .any(|r| r.status != ResultStatus::Success || r.last_execution_time < base_time)
    }

    pub fn newest_execution_time(&self) -> Option<Timestamp> {
        self.verifications
            .iter()
            .map(|r| r.last_execution_time)
            .max()
    }

    pub fn count(&self, status: ResultStatus) -> usize {
        self.verifications
            .iter()
            .filter(|r| r.status == status)
            .count()
    }
}

impl VerificationResult {
    pub fn load(filepath: impl AsRef<Path>) -> fsutil::Result<Self> {
        fsutil::read_json_with_deserialize(filepath)
    }

    pub fn save(&self, filepath: impl AsRef<Path>) -> fsutil::Result<()> {
        fsutil::write_json_atomically(filepath, self)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&FileResult> {
        self.files.get(path.as_ref())
    }

    pub fn is_success(&self) -> bool {
        self.files.values().all(FileResult::is_success)
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|(_, r)| !r.is_success())
            .map(|(path, _)| path.as_path())
    }

    /// Union of two results.
    /// A path present on both sides keeps the entry with the newer execution time
    /// (`other` wins ties), so merging shard outputs never loses a fresh result.
    pub fn merge(mut self, other: Self) -> Self {
        for (path, theirs) in other.files {
            match self.files.get(&path) {
                Some(ours) if ours.newest_execution_time() > theirs.newest_execution_time() => {}
                _ => {
                    self.files.insert(path, theirs);
                }
            }
        }
        self
    }
}
