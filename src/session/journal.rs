//! Local trial journal
//!
//! Append-only JSONL copy of every row handed to the gateway, written before
//! the network is touched. If the backend is unreachable the journal is the
//! recovery source; replaying it is safe because rows dedupe by key. One
//! session owns its journal file, so appends need no cross-process locking.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::record::SubmissionRecord;

pub struct TrialJournal {
    path: PathBuf,
}

impl TrialJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row as a single JSONL line.
    pub async fn append(&self, record: &SubmissionRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_string(record).map_err(io::Error::other)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(key = %record.key, path = %self.path.display(), "journaled trial row");
        Ok(())
    }

    /// Read every parseable row back. Damaged lines are skipped rather than
    /// failing the whole read.
    pub async fn load_all(&self) -> io::Result<Vec<SubmissionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
