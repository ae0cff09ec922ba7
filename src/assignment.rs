//! Group assignment
//!
//! Hands each new session one of the five stimulus groups. An explicit,
//! valid group request wins and locks the session to that group; otherwise
//! the next group comes from a rotation counter persisted as a small JSON
//! file. The counter is best-effort fairness, not a reservation: concurrent
//! writers may hand out the same group and last writer wins.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// Identifier of a stimulus group, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GroupId(u8);

impl GroupId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// `None` when `n` is outside `1..=5`.
    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> [GroupId; 5] {
        [GroupId(1), GroupId(2), GroupId(3), GroupId(4), GroupId(5)]
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for GroupId {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        GroupId::new(n).ok_or_else(|| format!("group id out of range: {n}"))
    }
}

impl From<GroupId> for u8 {
    fn from(group: GroupId) -> u8 {
        group.0
    }
}

/// A resolved group for one session. `locked` means the group was requested
/// explicitly and survives a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub group: GroupId,
    pub locked: bool,
}

/// Successor of `last` in the 1, 2, 3, 4, 5, 1 cycle. `last == 0` (no
/// prior session) starts the cycle at 1.
pub fn next_in_rotation(last: u8) -> GroupId {
    GroupId((last % GroupId::MAX) + 1)
}

/// Durable home of the rotation counter.
#[async_trait]
pub trait RotationStore: Send + Sync {
    /// Last group handed out, `0` when nothing has been recorded yet.
    /// Unreadable state reads as `0` so assignment can always proceed.
    async fn load_last(&self) -> u8;

    async fn save_last(&self, group: u8) -> Result<()>;
}

/// Resolve the group for a new session.
///
/// A valid explicit request locks the session to that group and leaves the
/// rotation counter untouched. An invalid or absent request falls through to
/// the rotation, which advances the counter.
pub async fn assign_group<S>(explicit: Option<u8>, store: &S) -> Result<Assignment>
where
    S: RotationStore + ?Sized,
{
    if let Some(group) = explicit.and_then(GroupId::new) {
        debug!(group = group.get(), "explicit group request, locking");
        return Ok(Assignment { group, locked: true });
    }

    let last = store.load_last().await;
    let group = next_in_rotation(last);
    store
        .save_last(group.get())
        .await
        .context("Failed to persist rotation counter")?;
    debug!(last, group = group.get(), "rotation assignment");
    Ok(Assignment { group, locked: false })
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RotationState {
    last_group: u8,
}

/// JSON-file backed [`RotationStore`].
pub struct FileRotationStore {
    path: PathBuf,
}

impl FileRotationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RotationStore for FileRotationStore {
    async fn load_last(&self) -> u8 {
        if !self.path.exists() {
            return 0;
        }
        match fs::read_to_string(&self.path).await {
            Ok(text) => match serde_json::from_str::<RotationState>(&text) {
                Ok(state) => state.last_group,
                Err(err) => {
                    warn!(error = %err, path = %self.path.display(), "rotation state unreadable, restarting cycle");
                    0
                }
            },
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "rotation state unreadable, restarting cycle");
                0
            }
        }
    }

    async fn save_last(&self, group: u8) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create rotation state directory")?;
        }
        let json = serde_json::to_string_pretty(&RotationState { last_group: group })
            .context("Failed to serialize rotation state")?;
        fs::write(&self.path, json)
            .await
            .context("Failed to write rotation state")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn group_id_rejects_out_of_range() {
        assert!(GroupId::new(0).is_none());
        assert!(GroupId::new(6).is_none());
        for n in 1..=5 {
            assert_eq!(GroupId::new(n).map(GroupId::get), Some(n));
        }
    }

    #[test]
    fn rotation_cycles_through_all_groups() {
        assert_eq!(next_in_rotation(0).get(), 1);
        assert_eq!(next_in_rotation(1).get(), 2);
        assert_eq!(next_in_rotation(4).get(), 5);
        assert_eq!(next_in_rotation(5).get(), 1);
        // Out-of-range stored values still land in range.
        assert_eq!(next_in_rotation(250).get(), 1);
    }

    #[test]
    fn group_id_serde_round_trip() {
        let group = GroupId::new(4).expect("valid");
        let json = serde_json::to_string(&group).expect("serialize");
        assert_eq!(json, "4");
        let back: GroupId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, group);
        assert!(serde_json::from_str::<GroupId>("9").is_err());
    }

    #[tokio::test]
    async fn file_store_defaults_missing_and_corrupt_to_zero() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rotation.json");
        let store = FileRotationStore::new(&path);
        assert_eq!(store.load_last().await, 0);

        tokio::fs::write(&path, "not json").await.expect("write");
        assert_eq!(store.load_last().await, 0);
    }

    #[tokio::test]
    async fn file_store_round_trips_through_nested_dir() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state").join("rotation.json");
        let store = FileRotationStore::new(&path);
        store.save_last(3).await.expect("save");

        let reopened = FileRotationStore::new(&path);
        assert_eq!(reopened.load_last().await, 3);
    }
}
