mod snapshot;
pub mod trigger;
pub mod types;

pub use snapshot::{commit_message, SnapshotWorkflow};
pub use types::WorkflowOutcome;
