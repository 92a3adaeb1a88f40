use crate::snapshot::Snapshot;

/// Outcome of a workflow execution.
#[derive(Debug, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The comment was not a recognized command; nothing happened.
    Ignored,
    /// Snapshots were published to the registry.
    Published { snapshots: Vec<Snapshot> },
    /// Snapshot versions were committed and force-pushed to a branch.
    PushedToBranch {
        branch: String,
        snapshots: Vec<Snapshot>,
    },
}
