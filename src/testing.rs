//! In-memory stand-ins for the tracker, git and the terminal.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

use anyhow::{anyhow, Result};

use crate::config::{Settings, DEFAULT_INTEGRATION_BRANCH};
use crate::git::{Git, GitOutput};
use crate::prompts::{suffix_or_default, BranchPrompt};
use crate::tracker::{Filter, Record, Tracker, DEFAULT_API_URL};

pub fn settings() -> Settings {
    Settings {
        api_token: "token".to_string(),
        project_id: 42,
        full_name: "Mr Test".to_string(),
        integration_branch: DEFAULT_INTEGRATION_BRANCH.to_string(),
        only_mine: false,
        quiet: false,
        verbose: false,
        api_url: DEFAULT_API_URL.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    List {
        project_id: u64,
        filter: String,
    },
    Update {
        project_id: u64,
        story_id: u64,
        fields: Vec<(String, String)>,
    },
    Note {
        project_id: u64,
        story_id: u64,
        text: String,
    },
}

/// Serves a fixed story list and answers updates from a script.
#[derive(Default)]
pub struct FakeTracker {
    stories: Vec<Record>,
    responses: RefCell<VecDeque<Record>>,
    fail_after: Cell<Option<usize>>,
    calls: RefCell<Vec<TrackerCall>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stories(xml: &str) -> Self {
        Self {
            stories: Record::parse_list(xml).unwrap(),
            ..Self::default()
        }
    }

    /// Queue the server's answer to the next update.
    pub fn respond(&self, xml: &str) {
        self.responses
            .borrow_mut()
            .push_back(Record::parse(xml).unwrap());
    }

    /// Let `count` updates through, reject the rest.
    pub fn fail_updates_after(&self, count: usize) {
        self.fail_after.set(Some(count));
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.borrow().clone()
    }

    fn updates(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, TrackerCall::Update { .. }))
            .count()
    }
}

impl Tracker for FakeTracker {
    fn list_stories(&self, project_id: u64, filter: &Filter) -> Result<Vec<Record>> {
        self.calls.borrow_mut().push(TrackerCall::List {
            project_id,
            filter: filter.to_string(),
        });
        Ok(self.stories.clone())
    }

    fn update_story(
        &self,
        project_id: u64,
        story_id: u64,
        fields: &[(&str, &str)],
    ) -> Result<Record> {
        self.calls.borrow_mut().push(TrackerCall::Update {
            project_id,
            story_id,
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });
        if let Some(limit) = self.fail_after.get() {
            if self.updates() > limit {
                return Err(anyhow!("Pivotal Tracker returned 422 Unprocessable Entity"));
            }
        }
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted response for story {story_id}"))
    }

    fn add_note(&self, project_id: u64, story_id: u64, text: &str) -> Result<String> {
        self.calls.borrow_mut().push(TrackerCall::Note {
            project_id,
            story_id,
            text: text.to_string(),
        });
        Ok(format!("<note><text>{text}</text></note>"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    ListBranches,
    Checkout(String),
    CheckoutNew(String),
    Merge(String),
    Delete(String),
}

/// Succeeds silently unless a command has a scripted output.
pub struct FakeGit {
    branches: String,
    outputs: RefCell<HashMap<String, GitOutput>>,
    calls: RefCell<Vec<GitCall>>,
}

impl FakeGit {
    pub fn new(branches: &str) -> Self {
        Self {
            branches: branches.to_string(),
            outputs: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(&self, command: &str, success: bool, text: &str) {
        self.outputs.borrow_mut().insert(
            command.to_string(),
            GitOutput {
                command: command.to_string(),
                success,
                text: text.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: GitCall, command: String) -> Result<GitOutput> {
        self.calls.borrow_mut().push(call);
        Ok(self
            .outputs
            .borrow()
            .get(&command)
            .cloned()
            .unwrap_or(GitOutput {
                command,
                success: true,
                text: String::new(),
            }))
    }
}

impl Git for FakeGit {
    fn list_branches(&self) -> Result<GitOutput> {
        self.calls.borrow_mut().push(GitCall::ListBranches);
        Ok(GitOutput {
            command: "git branch".to_string(),
            success: true,
            text: self.branches.clone(),
        })
    }

    fn checkout(&self, branch: &str) -> Result<GitOutput> {
        self.record(
            GitCall::Checkout(branch.to_string()),
            format!("git checkout {branch}"),
        )
    }

    fn checkout_new(&self, branch: &str) -> Result<GitOutput> {
        self.record(
            GitCall::CheckoutNew(branch.to_string()),
            format!("git checkout -b {branch}"),
        )
    }

    fn merge_no_ff(&self, branch: &str) -> Result<GitOutput> {
        self.record(
            GitCall::Merge(branch.to_string()),
            format!("git merge --no-ff {branch}"),
        )
    }

    fn delete_branch(&self, branch: &str) -> Result<GitOutput> {
        self.record(
            GitCall::Delete(branch.to_string()),
            format!("git branch -d {branch}"),
        )
    }
}

/// Answers branch prompts from a list, recording what was asked.
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<(u64, String)>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> Vec<(u64, String)> {
        self.asked.clone()
    }
}

impl BranchPrompt for ScriptedPrompt {
    fn branch_suffix(&mut self, story_id: u64, default: &str) -> Result<String> {
        self.asked.push((story_id, default.to_string()));
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected prompt for story {story_id}"))?;
        Ok(suffix_or_default(&answer, default))
    }
}

/// Console sink the test can read back.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
