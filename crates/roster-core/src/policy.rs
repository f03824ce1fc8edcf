//! Snapshot policy
//!
//! Decides, per resource, whether an existing snapshot is reused, replaced
//! silently, or replaced only after the operator confirms.

use crate::model::Resource;
use crate::store::SnapshotStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a stage treats a snapshot that is already on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotMode {
    /// Always fetch and overwrite
    AlwaysFetch,
    /// Use the snapshot as a read-through cache
    #[serde(alias = "reuse")]
    ReuseIfPresent,
    /// Ask before fetching again and overwriting
    #[default]
    #[serde(alias = "prompt")]
    PromptOnConflict,
}

impl FromStr for SnapshotMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always-fetch" | "always" => Ok(Self::AlwaysFetch),
            "reuse" | "reuse-if-present" => Ok(Self::ReuseIfPresent),
            "prompt" | "prompt-on-conflict" => Ok(Self::PromptOnConflict),
            _ => Err(format!("Invalid snapshot mode: {s}")),
        }
    }
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlwaysFetch => "always-fetch",
            Self::ReuseIfPresent => "reuse",
            Self::PromptOnConflict => "prompt",
        })
    }
}

/// Yes/no confirmation capability
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers yes to every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Answers no to every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// What a stage should do given the snapshot on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// Fetch from the platform and write a fresh snapshot
    Fetch,
    /// Read the existing snapshot, skip the network
    Reuse,
    /// The operator refused to overwrite; the pipeline stops here
    Declined,
}

/// Resolve the action for one stage
///
/// Planning never touches the store. A confirmed overwrite only returns
/// `Fetch`; the old artifacts are replaced when the stage saves.
pub fn plan_stage(
    store: &SnapshotStore,
    resource: Resource,
    mode: SnapshotMode,
    confirm: &dyn Confirm,
) -> StageAction {
    if !store.has_snapshot(resource) {
        return StageAction::Fetch;
    }

    let action = match mode {
        SnapshotMode::AlwaysFetch => StageAction::Fetch,
        SnapshotMode::ReuseIfPresent => StageAction::Reuse,
        SnapshotMode::PromptOnConflict => {
            let prompt = format!(
                "{} already exists. Fetch {} again and overwrite it?",
                store.snapshot_path(resource).display(),
                resource
            );
            if confirm.confirm(&prompt) {
                StageAction::Fetch
            } else {
                StageAction::Declined
            }
        }
    };

    tracing::debug!(resource = %resource, mode = %mode, ?action, "Planned stage");
    action
}
