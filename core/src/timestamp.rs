//! "Last relevant change" of a set of paths, from git history or from file mtimes.
//!
//! Both strategies report whole seconds in a fixed offset, since git commit times
//! have no sub-second component.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    process::Stdio,
    time::SystemTime,
};

use anyhow::{bail, Context as _};
use async_trait::async_trait;
use chrono::{DateTime, Local, SubsecRound};
use serde::Deserialize;
use tokio::process::Command;

use crate::models::Timestamp;

#[async_trait]
pub trait TimestampProvider: Send + Sync {
    async fn latest_change(&self, paths: &BTreeSet<PathBuf>) -> anyhow::Result<Timestamp>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimestampStrategy {
    Git,
    Filesystem,
}

impl TimestampStrategy {
    pub fn provider(self) -> Box<dyn TimestampProvider> {
        match self {
            Self::Git => Box::new(GitTimestamp::new()),
            Self::Filesystem => Box::new(FsTimestamp),
        }
    }
}

/// Truncates to whole seconds in the local offset.
pub fn to_local_timestamp(t: impl Into<DateTime<Local>>) -> Timestamp {
    t.into().trunc_subsecs(0).fixed_offset()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsTimestamp;

impl FsTimestamp {
    pub fn latest_change_sync<I, P>(paths: I) -> anyhow::Result<Timestamp>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let modified: SystemTime = fsutil::latest_modified_time(paths)?;
        Ok(to_local_timestamp(modified))
    }
}

#[async_trait]
impl TimestampProvider for FsTimestamp {
    async fn latest_change(&self, paths: &BTreeSet<PathBuf>) -> anyhow::Result<Timestamp> {
        Self::latest_change_sync(paths)
    }
}

/// Commit time of the newest commit touching any of the paths.
/// Paths without any commit (e.g. untracked files) fall back to their mtime.
#[derive(Debug, Clone)]
pub struct GitTimestamp {
    git: PathBuf,
    work_dir: Option<PathBuf>,
}

impl Default for GitTimestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl GitTimestamp {
    pub fn new() -> Self {
        Self {
            git: "git".into(),
            work_dir: None,
        }
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    async fn commit_time(&self, paths: &BTreeSet<PathBuf>) -> anyhow::Result<Option<Timestamp>> {
        let mut cmd = Command::new(&self.git);
        cmd.args(["log", "-1", "--format=%cI", "--"])
            .args(paths)
            .stdin(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await.context("Failed to spawn git")?;
        if !output.status.success() {
            bail!(
                "git log failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(None);
        }
        let t = DateTime::parse_from_rfc3339(stdout)
            .with_context(|| format!("Unexpected git timestamp '{}'", stdout))?;
        Ok(Some(to_local_timestamp(t)))
    }
}

#[async_trait]
impl TimestampProvider for GitTimestamp {
    async fn latest_change(&self, paths: &BTreeSet<PathBuf>) -> anyhow::Result<Timestamp> {
        if let Some(t) = self.commit_time(paths).await? {
            return Ok(t);
        }
        log::debug!("No commit found for {:?}; using modification time", paths);
        match &self.work_dir {
            Some(dir) => FsTimestamp::latest_change_sync(paths.iter().map(|p| dir.join(p))),
            None => FsTimestamp::latest_change_sync(paths),
        }
    }
}
