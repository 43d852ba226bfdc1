use anyhow::{anyhow, Context, Result};

use super::branch::branch_name;
use super::WorkflowKind;
use crate::config::Settings;
use crate::console::Console;
use crate::git::Git;
use crate::prompts::BranchPrompt;
use crate::story::{Story, STATE_UNSTARTED};
use crate::tracker::{Filter, Tracker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    NoStory,
    OwnershipRejected(u64),
    BranchCreated(String),
    BranchSwitched(String),
    BranchFailed(String),
}

impl PickOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            PickOutcome::NoStory | PickOutcome::BranchCreated(_) | PickOutcome::BranchSwitched(_) => 0,
            PickOutcome::OwnershipRejected(_) | PickOutcome::BranchFailed(_) => 1,
        }
    }
}

/// Starts the next unstarted story of one kind and puts the repository on its
/// branch.
pub struct Pick<'a> {
    kind: WorkflowKind,
    settings: &'a Settings,
    tracker: &'a dyn Tracker,
    git: &'a dyn Git,
}

impl<'a> Pick<'a> {
    pub fn new(
        kind: WorkflowKind,
        settings: &'a Settings,
        tracker: &'a dyn Tracker,
        git: &'a dyn Git,
    ) -> Self {
        Self {
            kind,
            settings,
            tracker,
            git,
        }
    }

    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new()
            .with("state", STATE_UNSTARTED)
            .with("type", self.kind.story_type);
        if self.settings.only_mine {
            filter.insert("owned_by", &self.settings.full_name);
        }
        filter
    }

    pub fn run(&self, console: &mut Console, prompt: &mut dyn BranchPrompt) -> Result<PickOutcome> {
        self.settings.owner()?;
        let mut message = format!(
            "Retrieving latest {} from Pivotal Tracker",
            self.kind.plural_type
        );
        if self.settings.only_mine {
            message.push_str(&format!(" for {}", self.settings.full_name));
        }
        console.put(message);

        let Some(mut story) = self.next_story()? else {
            console.put(format!("No {} available!", self.kind.plural_type));
            return Ok(PickOutcome::NoStory);
        };

        console.put(format!("Story: {}", story.name));
        console.put(format!("URL: {}", story.url));
        console.put(format!(
            "Updating {} status in Pivotal Tracker...",
            self.kind.story_type
        ));

        let story_id = story.id;
        story
            .start(self.tracker, &self.settings.full_name)
            .with_context(|| format!("failed to start story {story_id}"))?;

        // the tracker may refuse or race the ownership claim
        if story.owned_by != self.settings.full_name {
            console.put(format!("Unable to update {story_id}"));
            return Ok(PickOutcome::OwnershipRejected(story_id));
        }

        let default = self.kind.branch_suffix;
        let suffix = if self.settings.quiet {
            default.to_string()
        } else {
            prompt.branch_suffix(story.id, default)?
        };
        self.switch_to_branch(console, &branch_name(story.id, &suffix))
    }

    fn next_story(&self) -> Result<Option<Story>> {
        let records = self
            .tracker
            .list_stories(self.settings.project_id, &self.filter())
            .context("failed to list stories")?;
        match records.first() {
            Some(record) => Ok(Some(Story::parse(record)?)),
            None => Ok(None),
        }
    }

    fn switch_to_branch(&self, console: &mut Console, branch: &str) -> Result<PickOutcome> {
        let branches = self.git.list_branches()?;
        console.git(&branches);
        if branches.failed() {
            return Err(anyhow!("git branch failed: {}", branches.text));
        }

        // raw substring match against the listing
        let exists = branches.text.contains(branch);
        let output = if exists {
            console.put(format!("Switching to branch {branch}"));
            self.git.checkout(branch)?
        } else {
            console.put(format!("Creating new branch: {branch}"));
            self.git.checkout_new(branch)?
        };
        console.git(&output);

        if output.failed() {
            console.put(format!(
                "There was an error switching to {branch}:\n{}",
                output.text
            ));
            return Ok(PickOutcome::BranchFailed(branch.to_string()));
        }

        Ok(if exists {
            PickOutcome::BranchSwitched(branch.to_string())
        } else {
            PickOutcome::BranchCreated(branch.to_string())
        })
    }
}
