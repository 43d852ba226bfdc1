//! Story lifecycle workflows: pick a story and branch for it, then finish it
//! by merging the branch back into the integration branch.

mod branch;
mod finish;
mod pick;

pub use finish::{Finish, FinishOutcome};
pub use pick::{Pick, PickOutcome};

/// What distinguishes the feature, bug and chore pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowKind {
    pub story_type: &'static str,
    pub plural_type: &'static str,
    pub branch_suffix: &'static str,
}

pub const FEATURE: WorkflowKind = WorkflowKind {
    story_type: "feature",
    plural_type: "features",
    branch_suffix: "feature",
};

pub const BUG: WorkflowKind = WorkflowKind {
    story_type: "bug",
    plural_type: "bugs",
    branch_suffix: "bug",
};

pub const CHORE: WorkflowKind = WorkflowKind {
    story_type: "chore",
    plural_type: "chores",
    branch_suffix: "chore",
};
