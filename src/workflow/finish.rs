use anyhow::{anyhow, Context, Result};

use super::branch::story_id_from_branch;
use crate::config::Settings;
use crate::console::Console;
use crate::git::{current_branch, Git};
use crate::story::{Story, STATE_FINISHED};
use crate::tracker::{Filter, Tracker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    BadBranchFormat(String),
    StoryNotFound(u64),
    UpdateRejected(u64),
    CheckoutFailed(String),
    MergeFailed(String),
    Merged { story_id: u64, branch: String },
}

impl FinishOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            FinishOutcome::Merged { .. } => 0,
            _ => 1,
        }
    }
}

/// Finishes the story behind the current `<id>-<suffix>` branch and merges
/// that branch into the integration branch.
pub struct Finish<'a> {
    settings: &'a Settings,
    tracker: &'a dyn Tracker,
    git: &'a dyn Git,
}

impl<'a> Finish<'a> {
    pub fn new(settings: &'a Settings, tracker: &'a dyn Tracker, git: &'a dyn Git) -> Self {
        Self {
            settings,
            tracker,
            git,
        }
    }

    pub fn run(&self, console: &mut Console) -> Result<FinishOutcome> {
        self.settings.owner()?;
        let branches = self.git.list_branches()?;
        console.git(&branches);
        if branches.failed() {
            return Err(anyhow!("git branch failed: {}", branches.text));
        }
        let branch = current_branch(&branches.text)
            .unwrap_or_default()
            .to_string();

        let Some(story_id) = story_id_from_branch(&branch) else {
            console.put(format!(
                "The current branch name ({branch}) does not follow the correct format, please checkout the correct branch then re-run this command"
            ));
            return Ok(FinishOutcome::BadBranchFormat(branch));
        };

        let Some(mut story) = self.find_story(story_id)? else {
            console.put(format!(
                "Unable to find Story {story_id} owned by {}",
                self.settings.full_name
            ));
            return Ok(FinishOutcome::StoryNotFound(story_id));
        };

        console.put(format!("Marking Story {story_id} as finished..."));
        story
            .update_status(self.tracker, STATE_FINISHED)
            .with_context(|| format!("failed to finish story {story_id}"))?;
        if story.current_state != STATE_FINISHED {
            console.put(format!("Unable to mark Story {story_id} as finished"));
            return Ok(FinishOutcome::UpdateRejected(story_id));
        }

        let integration = &self.settings.integration_branch;
        console.put(format!("Merging {branch} into {integration}"));

        let checkout = self.git.checkout(integration)?;
        console.git(&checkout);
        if checkout.failed() {
            console.put(format!(
                "There was an error checking out {integration}:\n{}",
                checkout.text
            ));
            return Ok(FinishOutcome::CheckoutFailed(integration.clone()));
        }

        let merge = self.git.merge_no_ff(&branch)?;
        console.git(&merge);
        if merge.failed() {
            console.put(format!(
                "There was an error merging {branch} into {integration}:\n{}",
                merge.text
            ));
            return Ok(FinishOutcome::MergeFailed(branch));
        }

        console.put(format!("Removing {branch} branch"));
        let delete = self.git.delete_branch(&branch)?;
        console.git(&delete);
        if delete.failed() {
            console.put(format!("Unable to remove {branch} branch:\n{}", delete.text));
        }

        story
            .comment(
                self.tracker,
                &format!("Story finished by {}", self.settings.full_name),
            )
            .with_context(|| format!("failed to comment on story {story_id}"))?;

        Ok(FinishOutcome::Merged { story_id, branch })
    }

    /// First story owned by the configured user whose id matches.
    fn find_story(&self, story_id: u64) -> Result<Option<Story>> {
        let filter = Filter::new().with("owned_by", &self.settings.full_name);
        let records = self
            .tracker
            .list_stories(self.settings.project_id, &filter)
            .context("failed to list stories")?;
        let record = records.iter().find(|record| {
            record
                .text("id")
                .and_then(|id| id.trim().parse::<u64>().ok())
                == Some(story_id)
        });
        match record {
            Some(record) => Ok(Some(Story::parse(record)?)),
            None => Ok(None),
        }
    }
}
